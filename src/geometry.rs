//! Cross-section and volume of cylindrical specimens.
//!
//! Inputs are laboratory units (millimetres); the arithmetic runs on `uom`
//! quantities so every unit change is explicit.

use serde::{Deserialize, Serialize};
use uom::si::area::square_millimeter;
use uom::si::f64::{Area, Length, Volume};
use uom::si::length::millimeter;
use uom::si::volume::cubic_meter;

use crate::errors::SpecimenError;

/// Cross-sectional area of a cylinder as a typed quantity.
pub(crate) fn cross_section(diameter_mm: f64) -> Area {
    let radius = Length::new::<millimeter>(diameter_mm / 2.0);
    radius * radius * std::f64::consts::PI
}

/// Cross-sectional area in square millimetres of a cylinder with the given diameter.
///
/// The diameter must be positive; guarding against other values is the caller's job.
///
/// # Examples
/// ```
/// use concretelab::area_mm2;
///
/// assert!((area_mm2(150.0) - 17_671.458_676).abs() < 1.0e-6);
/// ```
#[must_use]
pub fn area_mm2(diameter_mm: f64) -> f64 {
    cross_section(diameter_mm).get::<square_millimeter>()
}

/// Volume in cubic metres of a cylinder given its diameter and height in millimetres.
///
/// # Examples
/// ```
/// use concretelab::volume_m3;
///
/// let volume = volume_m3(150.0, 300.0);
/// assert!((volume - 0.005_301_437_6).abs() < 1.0e-9);
/// ```
#[must_use]
pub fn volume_m3(diameter_mm: f64, height_mm: f64) -> f64 {
    let volume: Volume = cross_section(diameter_mm) * Length::new::<millimeter>(height_mm);
    volume.get::<cubic_meter>()
}

/// Derived geometry of a specimen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryResult {
    /// Cross-sectional area in square millimetres.
    pub area_mm2: f64,
    /// Volume in cubic metres.
    pub volume_m3: f64,
}

/// Validated dimensions of a cylindrical specimen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CylinderGeometry {
    diameter_mm: f64,
    height_mm: f64,
}

impl CylinderGeometry {
    /// Create a geometry after checking both dimensions are positive and finite.
    ///
    /// # Errors
    ///
    /// Returns [`SpecimenError::InvalidGeometry`] when either dimension is zero,
    /// negative, infinite or NaN.
    pub fn new(diameter_mm: f64, height_mm: f64) -> Result<Self, SpecimenError> {
        let valid = |value: f64| value.is_finite() && value > 0.0;
        if valid(diameter_mm) && valid(height_mm) {
            Ok(Self {
                diameter_mm,
                height_mm,
            })
        } else {
            Err(SpecimenError::InvalidGeometry {
                diameter: diameter_mm,
                height: height_mm,
            })
        }
    }

    /// Diameter in millimetres.
    #[must_use]
    pub const fn diameter_mm(&self) -> f64 {
        self.diameter_mm
    }

    /// Height in millimetres.
    #[must_use]
    pub const fn height_mm(&self) -> f64 {
        self.height_mm
    }

    /// Height to diameter ratio (L/D), unrounded.
    #[must_use]
    pub fn slenderness_ratio(&self) -> f64 {
        self.height_mm / self.diameter_mm
    }

    /// Area and volume of the specimen.
    #[must_use]
    pub fn result(&self) -> GeometryResult {
        GeometryResult {
            area_mm2: area_mm2(self.diameter_mm),
            volume_m3: volume_m3(self.diameter_mm, self.height_mm),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn volume_matches_closed_form() {
        for (d, h) in [(100.0, 200.0), (150.0, 300.0), (75.0, 112.5), (1.0, 1.0)] {
            let expected = std::f64::consts::PI * (d / 2.0_f64).powi(2) * h / 1.0e9;
            assert_relative_eq!(volume_m3(d, h), expected, max_relative = 1.0e-12);
        }
    }

    #[test]
    fn volume_grows_with_both_dimensions() {
        let base = volume_m3(100.0, 200.0);
        assert!(volume_m3(100.5, 200.0) > base);
        assert!(volume_m3(100.0, 200.5) > base);
    }

    #[test]
    fn standard_cylinder_geometry() {
        let geometry = CylinderGeometry::new(150.0, 300.0).expect("valid geometry");
        let result = geometry.result();
        assert_relative_eq!(result.area_mm2, 17_671.46, epsilon = 0.01);
        assert_relative_eq!(result.volume_m3, 0.005_301, epsilon = 1.0e-6);
        assert_relative_eq!(geometry.slenderness_ratio(), 2.0);
    }

    #[test]
    fn non_positive_dimensions_are_rejected() {
        for (d, h) in [(0.0, 200.0), (100.0, 0.0), (-1.0, 200.0), (f64::NAN, 200.0)] {
            let error = CylinderGeometry::new(d, h).expect_err("invalid geometry rejected");
            assert!(matches!(error, SpecimenError::InvalidGeometry { .. }));
        }
    }
}
