//! Density, compressive strength and strength evolution of a specimen.

use serde::{Deserialize, Serialize};
use uom::si::f64::{Force, Mass, MassDensity, Pressure, Volume};
use uom::si::force::kilonewton;
use uom::si::mass::kilogram;
use uom::si::mass_density::kilogram_per_cubic_meter;
use uom::si::pressure::megapascal;
use uom::si::volume::cubic_meter;

use crate::geometry::{cross_section, GeometryResult};

/// Granularity of reported densities in kg/m³.
pub const DENSITY_STEP: f64 = 10.0;

/// Round `value` half away from zero to `places` decimal places.
///
/// # Examples
/// ```
/// use concretelab::round_to;
///
/// assert_eq!(round_to(19.806, 2), 19.81);
/// assert_eq!(round_to(-2.345, 1), -2.3);
/// ```
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10_f64.powi(places);
    (value * scale).round() / scale
}

/// Density in kg/m³ rounded to the nearest multiple of [`DENSITY_STEP`].
///
/// A non-positive volume or mass yields `0.0`, the value recorded for a
/// specimen that was not weighed.
///
/// # Examples
/// ```
/// use concretelab::{density_kg_m3, volume_m3};
///
/// let volume = volume_m3(150.0, 300.0);
/// assert_eq!(density_kg_m3(volume, 12.5), 2360.0);
/// assert_eq!(density_kg_m3(volume, 0.0), 0.0);
/// ```
#[must_use]
pub fn density_kg_m3(volume_m3: f64, mass_kg: f64) -> f64 {
    if volume_m3 <= 0.0 || mass_kg <= 0.0 {
        return 0.0;
    }
    let density: MassDensity =
        Mass::new::<kilogram>(mass_kg) / Volume::new::<cubic_meter>(volume_m3);
    let value = density.get::<kilogram_per_cubic_meter>();
    (value / DENSITY_STEP).round() * DENSITY_STEP
}

/// Compressive strength in MPa, rounded to two decimals, of a cylinder of
/// `diameter_mm` failing under `load_kn`.
///
/// # Examples
/// ```
/// use concretelab::compressive_strength_mpa;
///
/// assert_eq!(compressive_strength_mpa(350.0, 150.0), 19.81);
/// assert_eq!(compressive_strength_mpa(0.0, 150.0), 0.0);
/// ```
#[must_use]
pub fn compressive_strength_mpa(load_kn: f64, diameter_mm: f64) -> f64 {
    let stress: Pressure = Force::new::<kilonewton>(load_kn) / cross_section(diameter_mm);
    round_to(stress.get::<megapascal>(), 2)
}

/// Measured strength as a percentage of the design strength, two decimals.
///
/// A non-positive design strength means no target was set; progress is then
/// reported as `0.0`.
///
/// # Examples
/// ```
/// use concretelab::evolution_pct;
///
/// assert_eq!(evolution_pct(100.0, 100.0), 100.0);
/// assert_eq!(evolution_pct(0.0, 35.0), 0.0);
/// ```
#[must_use]
pub fn evolution_pct(design_strength_mpa: f64, measured_strength_mpa: f64) -> f64 {
    if design_strength_mpa > 0.0 {
        round_to(measured_strength_mpa / design_strength_mpa * 100.0, 2)
    } else {
        0.0
    }
}

/// Apply a slenderness correction factor to a raw strength.
#[must_use]
pub fn corrected_strength_mpa(raw_strength_mpa: f64, factor: f64) -> f64 {
    round_to(raw_strength_mpa * factor, 2)
}

/// Everything derived from one cylinder test.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrengthResult {
    /// Area and volume of the specimen.
    pub geometry: GeometryResult,
    /// Height/diameter ratio rounded to two decimals.
    pub slenderness_ratio: f64,
    /// Density in kg/m³, a multiple of ten or zero when unweighed.
    pub density_kg_m3: f64,
    /// Strength from load and area alone, MPa.
    pub raw_strength_mpa: f64,
    /// Correction factor applied, if the specimen needed one.
    pub correction_factor: Option<f64>,
    /// Corrected strength, present only when a factor was applied.
    pub corrected_strength_mpa: Option<f64>,
    /// Reported strength relative to the design strength, percent.
    pub evolution_pct: f64,
}

impl StrengthResult {
    /// Strength to report: corrected when a correction applied, raw otherwise.
    #[must_use]
    pub fn strength_mpa(&self) -> f64 {
        self.corrected_strength_mpa.unwrap_or(self.raw_strength_mpa)
    }
}
