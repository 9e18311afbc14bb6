//! Compressive strength of 50 mm cement mortar cubes.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uom::si::area::square_millimeter;
use uom::si::f64::{Area, Force, Pressure};
use uom::si::force::kilonewton;
use uom::si::pressure::megapascal;

use crate::errors::ExportError;
use crate::specimen::TestAge;
use crate::strength::round_to;

/// Edge of a mortar cube in millimetres.
pub const CUBE_SIDE_MM: f64 = 50.0;

/// Loaded face of a mortar cube in square millimetres.
pub const CUBE_AREA_MM2: f64 = CUBE_SIDE_MM * CUBE_SIDE_MM;

/// Strength in MPa of a cube failing under `load_kn`; zero without load.
///
/// # Examples
/// ```
/// use concretelab::cube_strength_mpa;
///
/// assert_eq!(cube_strength_mpa(75.0), 30.0);
/// assert_eq!(cube_strength_mpa(0.0), 0.0);
/// ```
#[must_use]
pub fn cube_strength_mpa(load_kn: f64) -> f64 {
    if load_kn > 0.0 {
        let stress: Pressure =
            Force::new::<kilonewton>(load_kn) / Area::new::<square_millimeter>(CUBE_AREA_MM2);
        stress.get::<megapascal>()
    } else {
        0.0
    }
}

/// One tested cube.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MortarCube {
    /// Mass in grams.
    pub mass_g: f64,
    /// Maximum load in kilonewtons.
    pub load_kn: f64,
    /// Whether the result counts towards the summary.
    pub valid: bool,
    /// Free-form remarks.
    pub notes: String,
}

impl MortarCube {
    /// A valid cube without remarks.
    #[must_use]
    pub fn new(mass_g: f64, load_kn: f64) -> Self {
        Self {
            mass_g,
            load_kn,
            valid: true,
            notes: String::new(),
        }
    }

    /// Strength of this cube in MPa.
    #[must_use]
    pub fn strength_mpa(&self) -> f64 {
        cube_strength_mpa(self.load_kn)
    }
}

/// Statistics over the valid cubes of a series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CubeSummary {
    /// Number of valid cubes.
    pub count: usize,
    /// Mean strength, MPa.
    pub mean_mpa: f64,
    /// Lowest strength, MPa.
    pub min_mpa: f64,
    /// Highest strength, MPa.
    pub max_mpa: f64,
    /// Sample standard deviation over the mean, percent.
    pub coefficient_of_variation_pct: f64,
}

/// Summarise the valid cubes; `None` when no cube is valid.
///
/// The coefficient of variation uses the sample (n − 1) standard deviation and
/// is zero for a single cube or a non-positive mean.
#[must_use]
pub fn summarize(cubes: &[MortarCube]) -> Option<CubeSummary> {
    let strengths: Vec<f64> = cubes
        .iter()
        .filter(|cube| cube.valid)
        .map(MortarCube::strength_mpa)
        .collect();
    if strengths.is_empty() {
        return None;
    }

    let count = strengths.len();
    let mean_mpa = strengths.iter().sum::<f64>() / count as f64;
    let min_mpa = strengths.iter().copied().fold(f64::INFINITY, f64::min);
    let max_mpa = strengths.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let coefficient_of_variation_pct = if count > 1 && mean_mpa > 0.0 {
        let variance = strengths
            .iter()
            .map(|strength| (strength - mean_mpa).powi(2))
            .sum::<f64>()
            / (count - 1) as f64;
        variance.sqrt() / mean_mpa * 100.0
    } else {
        0.0
    };

    Some(CubeSummary {
        count,
        mean_mpa,
        min_mpa,
        max_mpa,
        coefficient_of_variation_pct,
    })
}

/// Cement the cubes were cast with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CementType {
    /// Ordinary Portland cement.
    #[default]
    OrdinaryPortland,
    /// Compound Portland cement.
    CompoundPortland,
    /// Slag cement.
    Slag,
    /// Anything else.
    Other,
}

impl fmt::Display for CementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CementType::OrdinaryPortland => "ordinary Portland",
            CementType::CompoundPortland => "compound Portland",
            CementType::Slag => "slag",
            CementType::Other => "other",
        })
    }
}

impl FromStr for CementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ordinary" | "opc" => Ok(CementType::OrdinaryPortland),
            "compound" | "cpc" => Ok(CementType::CompoundPortland),
            "slag" => Ok(CementType::Slag),
            "other" => Ok(CementType::Other),
            _ => Err(format!(
                "expected ordinary, compound, slag or other, got `{s}`"
            )),
        }
    }
}

/// Cubes tested together from one cement lot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CubeSeries {
    /// Cement type.
    pub cement: CementType,
    /// Cement lot or batch identifier.
    pub lot: String,
    /// Age at testing.
    pub age: TestAge,
    /// Cubes in testing order.
    pub cubes: Vec<MortarCube>,
}

impl CubeSeries {
    /// An empty 28-day series of ordinary Portland cement.
    #[must_use]
    pub fn new<S: Into<String>>(lot: S) -> Self {
        Self {
            cement: CementType::default(),
            lot: lot.into(),
            age: TestAge::TwentyEightDays,
            cubes: Vec::new(),
        }
    }

    /// Set the cement type.
    #[must_use]
    pub fn with_cement(mut self, cement: CementType) -> Self {
        self.cement = cement;
        self
    }

    /// Set the age at testing.
    #[must_use]
    pub fn with_age(mut self, age: TestAge) -> Self {
        self.age = age;
        self
    }

    /// Add a cube at the end of the series.
    pub fn push(&mut self, cube: MortarCube) {
        self.cubes.push(cube);
    }

    /// Statistics over the valid cubes.
    #[must_use]
    pub fn summary(&self) -> Option<CubeSummary> {
        summarize(&self.cubes)
    }

    /// Write the cube table as CSV, one row per cube.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] when a row cannot be written.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        write_cubes_csv(&self.cubes, writer)
    }
}

/// One line of the exported cube table.
#[derive(Serialize)]
struct CubeRow<'a> {
    #[serde(rename = "Cube")]
    label: String,
    #[serde(rename = "Mass (g)")]
    mass_g: f64,
    #[serde(rename = "Load (kN)")]
    load_kn: f64,
    #[serde(rename = "Strength (MPa)")]
    strength_mpa: f64,
    #[serde(rename = "Notes")]
    notes: &'a str,
    #[serde(rename = "Valid")]
    valid: bool,
}

/// Write `cubes` as CSV with a `#1`, `#2`, ... label per cube and the
/// strength rounded to two decimals.
///
/// # Errors
///
/// Returns [`ExportError`] when a row cannot be written.
pub fn write_cubes_csv<W: Write>(cubes: &[MortarCube], writer: W) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for (index, cube) in cubes.iter().enumerate() {
        csv.serialize(CubeRow {
            label: format!("#{}", index + 1),
            mass_g: cube.mass_g,
            load_kn: cube.load_kn,
            strength_mpa: round_to(cube.strength_mpa(), 2),
            notes: &cube.notes,
            valid: cube.valid,
        })?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn summary_ignores_invalid_cubes() {
        let mut cubes = vec![
            MortarCube::new(330.0, 70.0),
            MortarCube::new(331.0, 75.0),
            MortarCube::new(329.5, 80.0),
            MortarCube::new(330.0, 20.0),
        ];
        cubes[3].valid = false;
        let summary = summarize(&cubes).expect("valid cubes present");
        assert_eq!(summary.count, 3);
        assert_relative_eq!(summary.mean_mpa, 30.0, epsilon = 1.0e-9);
        assert_relative_eq!(summary.min_mpa, 28.0, epsilon = 1.0e-9);
        assert_relative_eq!(summary.max_mpa, 32.0, epsilon = 1.0e-9);
        // Strengths 28, 30, 32: sample deviation 2.
        assert_relative_eq!(summary.coefficient_of_variation_pct, 200.0 / 30.0, epsilon = 1.0e-9);
    }

    #[test]
    fn single_cube_has_no_spread() {
        let summary = summarize(&[MortarCube::new(330.0, 60.0)]).expect("one cube");
        assert_relative_eq!(summary.coefficient_of_variation_pct, 0.0);
    }

    #[test]
    fn series_exports_one_row_per_cube() {
        let mut series = CubeSeries::new("L-2024-07")
            .with_cement(CementType::CompoundPortland)
            .with_age(TestAge::SevenDays);
        series.push(MortarCube::new(330.0, 75.0));
        let mut cracked = MortarCube::new(328.5, 52.3);
        cracked.valid = false;
        cracked.notes = "cracked corner".to_string();
        series.push(cracked);

        let mut buffer = Vec::new();
        series.write_csv(&mut buffer).expect("writing to memory");
        let text = String::from_utf8(buffer).expect("utf-8 output");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Cube,Mass (g),Load (kN),Strength (MPa),Notes,Valid",
                "#1,330.0,75.0,30.0,,true",
                "#2,328.5,52.3,20.92,cracked corner,false",
            ]
        );
        assert_eq!(series.summary().map(|summary| summary.count), Some(1));
    }

    #[test]
    fn cement_types_parse_from_short_names() {
        assert_eq!("OPC".parse(), Ok(CementType::OrdinaryPortland));
        assert_eq!("compound".parse(), Ok(CementType::CompoundPortland));
        assert!("portland".parse::<CementType>().is_err());
        assert_eq!(CementType::Slag.to_string(), "slag");
    }

    #[test]
    fn no_valid_cube_means_no_summary() {
        let mut cube = MortarCube::new(330.0, 60.0);
        cube.valid = false;
        assert_eq!(summarize(&[cube]), None);
        assert_eq!(summarize(&[]), None);
    }
}
