//! Concrete cylinder specimens and their evaluation.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::SpecimenError;
use crate::geometry::CylinderGeometry;
use crate::records::SpecimenRecord;
use crate::slenderness::{rounded_ratio, SlendernessTable};
use crate::strength::{
    compressive_strength_mpa, corrected_strength_mpa, density_kg_m3, evolution_pct,
    StrengthResult,
};

/// Number of characters of the failure description kept in records.
pub const FAILURE_TAG_WIDTH: usize = 6;

/// Age of a specimen at testing, with its permitted tolerance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestAge {
    /// 24 hours, ±0.5 h.
    OneDay,
    /// 3 days, ±2 h.
    ThreeDays,
    /// 7 days, ±6 h.
    SevenDays,
    /// 28 days, ±20 h.
    TwentyEightDays,
    /// 90 days, ±48 h.
    NinetyDays,
}

impl TestAge {
    /// Every test age, youngest first.
    pub const ALL: [TestAge; 5] = [
        TestAge::OneDay,
        TestAge::ThreeDays,
        TestAge::SevenDays,
        TestAge::TwentyEightDays,
        TestAge::NinetyDays,
    ];

    /// Age in days.
    #[must_use]
    pub const fn days(self) -> u16 {
        match self {
            TestAge::OneDay => 1,
            TestAge::ThreeDays => 3,
            TestAge::SevenDays => 7,
            TestAge::TwentyEightDays => 28,
            TestAge::NinetyDays => 90,
        }
    }

    /// Permitted deviation from the nominal age, in hours.
    #[must_use]
    pub const fn tolerance_hours(self) -> f64 {
        match self {
            TestAge::OneDay => 0.5,
            TestAge::ThreeDays => 2.0,
            TestAge::SevenDays => 6.0,
            TestAge::TwentyEightDays => 20.0,
            TestAge::NinetyDays => 48.0,
        }
    }

    /// Test age for a number of days, if it is one of the standard ages.
    #[must_use]
    pub fn from_days(days: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|age| age.days() == days)
    }
}

impl fmt::Display for TestAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} d (±{} h)", self.days(), self.tolerance_hours())
    }
}

/// Fracture pattern observed after the test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureMode {
    /// Reasonably well-formed cones on both ends.
    Type1,
    /// Well-formed cone on one end only.
    Type2,
    /// Columnar vertical cracking through both ends.
    Type3,
    /// Diagonal fracture without cracking through the ends.
    Type4,
    /// Side fractures at the top or bottom.
    Type5,
    /// Pointed end.
    Type6,
}

impl FailureMode {
    /// Every failure mode in numbering order.
    pub const ALL: [FailureMode; 6] = [
        FailureMode::Type1,
        FailureMode::Type2,
        FailureMode::Type3,
        FailureMode::Type4,
        FailureMode::Type5,
        FailureMode::Type6,
    ];

    /// Full description shown to the operator.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            FailureMode::Type1 => "Type 1: well-formed cones on both ends",
            FailureMode::Type2 => "Type 2: well-formed cone on one end",
            FailureMode::Type3 => "Type 3: vertical cracks through both ends",
            FailureMode::Type4 => "Type 4: diagonal fracture without cracks",
            FailureMode::Type5 => "Type 5: side fractures at top or bottom",
            FailureMode::Type6 => "Type 6: pointed end",
        }
    }

    /// Fixed-width code stored in records, e.g. `Type 3`.
    #[must_use]
    pub fn tag(self) -> String {
        self.description().chars().take(FAILURE_TAG_WIDTH).collect()
    }
}

impl FromStr for FailureMode {
    type Err = String;

    /// Accepts the type number, `1` to `6`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or_else(|| format!("failure type must be a number from 1 to 6, got `{s}`"))
    }
}

/// Proportions the operator declared for the specimen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Proportions {
    /// 100 mm × 200 mm cylinder.
    Standard100x200,
    /// 150 mm × 300 mm cylinder.
    Standard150x300,
    /// Any other size; strength is corrected for slenderness.
    Other,
}

impl Proportions {
    /// Nominal diameter and height in millimetres.
    #[must_use]
    pub const fn nominal_dimensions(self) -> (f64, f64) {
        match self {
            Proportions::Standard100x200 => (100.0, 200.0),
            Proportions::Standard150x300 => (150.0, 300.0),
            Proportions::Other => (100.0, 100.0),
        }
    }

    /// Whether the specimen has the standard L/D of 2.
    #[must_use]
    pub const fn is_standard(self) -> bool {
        !matches!(self, Proportions::Other)
    }
}

impl FromStr for Proportions {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "100x200" => Ok(Proportions::Standard100x200),
            "150x300" => Ok(Proportions::Standard150x300),
            "other" => Ok(Proportions::Other),
            _ => Err(format!("expected 100x200, 150x300 or other, got `{s}`")),
        }
    }
}

/// Correction factor for a specimen with the given proportions and L/D ratio.
///
/// Standard specimens never consult the table. Other specimens are corrected
/// with the table factor for `1.00 <= L/D <= 1.99`, left uncorrected for
/// `1.99 < L/D <= 2.00` and rejected otherwise. The range checks use the
/// measured ratio; only the table key is rounded.
///
/// # Errors
///
/// Returns [`SpecimenError::SlendernessOutOfRange`] for a non-standard specimen
/// whose ratio the table cannot cover.
///
/// # Examples
/// ```
/// use concretelab::{slenderness_factor, Proportions, SlendernessTable, SpecimenError};
///
/// let table = SlendernessTable::embedded()?;
/// assert_eq!(slenderness_factor(Proportions::Other, 1.5, &table), Ok(Some(0.96)));
/// assert_eq!(slenderness_factor(Proportions::Other, 2.0, &table), Ok(None));
/// assert_eq!(slenderness_factor(Proportions::Standard150x300, 1.5, &table), Ok(None));
/// assert_eq!(
///     slenderness_factor(Proportions::Other, 0.8, &table),
///     Err(SpecimenError::SlendernessOutOfRange { ratio: 0.8 })
/// );
/// # Ok::<(), concretelab::ReferenceDataError>(())
/// ```
pub fn slenderness_factor(
    proportions: Proportions,
    ratio: f64,
    table: &SlendernessTable,
) -> Result<Option<f64>, SpecimenError> {
    if proportions.is_standard() {
        return Ok(None);
    }
    if ratio.is_nan() || ratio < 1.0 {
        return Err(SpecimenError::SlendernessOutOfRange { ratio });
    }
    if let Some(factor) = table.factor(ratio) {
        return Ok(Some(factor));
    }
    if ratio <= 2.0 {
        Ok(None)
    } else {
        Err(SpecimenError::SlendernessOutOfRange { ratio })
    }
}

/// Measurements of one cylinder as submitted by the operator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Specimen {
    /// Sample name.
    pub name: String,
    /// Declared proportions.
    pub proportions: Proportions,
    /// Measured diameter in millimetres.
    pub diameter_mm: f64,
    /// Measured height in millimetres.
    pub height_mm: f64,
    /// Mass in kilograms; zero when the specimen was not weighed.
    pub mass_kg: f64,
    /// Maximum load in kilonewtons.
    pub load_kn: f64,
    /// Design strength f'c in MPa; zero when unknown.
    pub design_strength_mpa: f64,
    /// Age at testing.
    pub age: TestAge,
    /// Observed fracture pattern.
    pub failure: FailureMode,
}

impl Specimen {
    /// Start a specimen with the nominal dimensions of `proportions`, no mass,
    /// no load, no design strength, tested at 7 days with a type 1 fracture.
    #[must_use]
    pub fn new(name: impl Into<String>, proportions: Proportions) -> Self {
        let (diameter_mm, height_mm) = proportions.nominal_dimensions();
        Self {
            name: name.into(),
            proportions,
            diameter_mm,
            height_mm,
            mass_kg: 0.0,
            load_kn: 0.0,
            design_strength_mpa: 0.0,
            age: TestAge::SevenDays,
            failure: FailureMode::Type1,
        }
    }

    /// Replace the nominal dimensions with measured ones.
    #[must_use]
    pub fn with_dimensions(mut self, diameter_mm: f64, height_mm: f64) -> Self {
        self.diameter_mm = diameter_mm;
        self.height_mm = height_mm;
        self
    }

    /// Set the mass in kilograms.
    #[must_use]
    pub fn with_mass(mut self, mass_kg: f64) -> Self {
        self.mass_kg = mass_kg;
        self
    }

    /// Set the maximum load in kilonewtons.
    #[must_use]
    pub fn with_load(mut self, load_kn: f64) -> Self {
        self.load_kn = load_kn;
        self
    }

    /// Set the design strength in MPa.
    #[must_use]
    pub fn with_design_strength(mut self, design_strength_mpa: f64) -> Self {
        self.design_strength_mpa = design_strength_mpa;
        self
    }

    /// Set the age at testing.
    #[must_use]
    pub fn with_age(mut self, age: TestAge) -> Self {
        self.age = age;
        self
    }

    /// Set the fracture pattern.
    #[must_use]
    pub fn with_failure(mut self, failure: FailureMode) -> Self {
        self.failure = failure;
        self
    }

    /// Derive density, strength and evolution.
    ///
    /// Geometry and slenderness are checked before anything is computed.
    ///
    /// # Errors
    ///
    /// Returns [`SpecimenError::InvalidGeometry`] for non-positive dimensions,
    /// [`SpecimenError::InvalidMeasurement`] for a negative mass or load and
    /// [`SpecimenError::SlendernessOutOfRange`] when a non-standard specimen
    /// cannot be corrected.
    ///
    /// # Examples
    /// ```
    /// use concretelab::{Proportions, SlendernessTable, Specimen};
    ///
    /// let table = SlendernessTable::embedded()?;
    /// let result = Specimen::new("M-1", Proportions::Standard150x300)
    ///     .with_mass(12.5)
    ///     .with_load(350.0)
    ///     .with_design_strength(21.0)
    ///     .evaluate(&table)?;
    /// assert_eq!(result.density_kg_m3, 2360.0);
    /// assert_eq!(result.strength_mpa(), 19.81);
    /// assert_eq!(result.evolution_pct, 94.33);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn evaluate(&self, table: &SlendernessTable) -> Result<StrengthResult, SpecimenError> {
        let geometry = CylinderGeometry::new(self.diameter_mm, self.height_mm)?;
        for (quantity, value) in [("mass", self.mass_kg), ("load", self.load_kn)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SpecimenError::InvalidMeasurement { quantity, value });
            }
        }
        let ratio = geometry.slenderness_ratio();
        let correction_factor = slenderness_factor(self.proportions, ratio, table)?;

        let derived = geometry.result();
        let raw_strength_mpa = compressive_strength_mpa(self.load_kn, self.diameter_mm);
        let corrected_strength_mpa =
            correction_factor.map(|factor| corrected_strength_mpa(raw_strength_mpa, factor));
        let reported = corrected_strength_mpa.unwrap_or(raw_strength_mpa);

        Ok(StrengthResult {
            geometry: derived,
            slenderness_ratio: rounded_ratio(ratio),
            density_kg_m3: density_kg_m3(derived.volume_m3, self.mass_kg),
            raw_strength_mpa,
            correction_factor,
            corrected_strength_mpa,
            evolution_pct: evolution_pct(self.design_strength_mpa, reported),
        })
    }

    /// Build the record appended to the results collection.
    #[must_use]
    pub fn record(&self, result: &StrengthResult, date: NaiveDate) -> SpecimenRecord {
        SpecimenRecord {
            sample: self.name.clone(),
            date,
            age_days: self.age.days(),
            diameter_mm: self.diameter_mm,
            height_mm: self.height_mm,
            density_kg_m3: result.density_kg_m3,
            load_kn: self.load_kn,
            strength_mpa: result.strength_mpa(),
            evolution_pct: result.evolution_pct,
            failure: self.failure.tag(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn table() -> SlendernessTable {
        SlendernessTable::embedded().expect("embedded table is valid")
    }

    #[test]
    fn standard_specimen_is_not_corrected() {
        let result = Specimen::new("A", Proportions::Standard100x200)
            .with_load(200.0)
            .with_design_strength(28.0)
            .evaluate(&table())
            .expect("valid specimen");
        assert_eq!(result.correction_factor, None);
        assert_eq!(result.corrected_strength_mpa, None);
        assert_relative_eq!(result.raw_strength_mpa, 25.46);
        assert_relative_eq!(result.evolution_pct, 90.93);
        assert_relative_eq!(result.slenderness_ratio, 2.0);
        assert_eq!(result.density_kg_m3, 0.0);
    }

    #[test]
    fn short_specimen_is_corrected_with_table_factor() {
        let result = Specimen::new("B", Proportions::Other)
            .with_dimensions(100.0, 150.0)
            .with_load(200.0)
            .with_design_strength(28.0)
            .evaluate(&table())
            .expect("valid specimen");
        assert_eq!(result.correction_factor, Some(0.96));
        assert_relative_eq!(result.raw_strength_mpa, 25.46);
        assert_eq!(result.corrected_strength_mpa, Some(24.44));
        assert_relative_eq!(result.strength_mpa(), 24.44);
        assert_relative_eq!(result.evolution_pct, 87.29);
    }

    #[test]
    fn non_standard_ratio_two_is_left_alone() {
        let result = Specimen::new("C", Proportions::Other)
            .with_dimensions(75.0, 150.0)
            .with_load(100.0)
            .evaluate(&table())
            .expect("valid specimen");
        assert_eq!(result.correction_factor, None);
    }

    #[test]
    fn range_checks_use_the_measured_ratio() {
        let table = table();
        assert_eq!(
            slenderness_factor(Proportions::Other, 1.986, &table),
            Ok(Some(0.999))
        );
        assert_eq!(slenderness_factor(Proportions::Other, 1.994, &table), Ok(None));
        assert_eq!(slenderness_factor(Proportions::Other, 2.0, &table), Ok(None));
        assert_eq!(
            slenderness_factor(Proportions::Other, 2.004, &table),
            Err(SpecimenError::SlendernessOutOfRange { ratio: 2.004 })
        );
        assert_eq!(
            slenderness_factor(Proportions::Other, 0.996, &table),
            Err(SpecimenError::SlendernessOutOfRange { ratio: 0.996 })
        );
    }

    #[test]
    fn specimen_just_above_the_table_is_not_corrected() {
        let result = Specimen::new("C2", Proportions::Other)
            .with_dimensions(100.0, 199.4)
            .with_load(200.0)
            .evaluate(&table())
            .expect("valid specimen");
        assert_eq!(result.correction_factor, None);
        assert_eq!(result.corrected_strength_mpa, None);
        assert_relative_eq!(result.strength_mpa(), 25.46);
    }

    #[test]
    fn out_of_range_slenderness_is_rejected() {
        for (d, h) in [(100.0, 90.0), (100.0, 250.0)] {
            let error = Specimen::new("D", Proportions::Other)
                .with_dimensions(d, h)
                .with_load(100.0)
                .evaluate(&table())
                .expect_err("ratio rejected");
            assert!(matches!(error, SpecimenError::SlendernessOutOfRange { .. }));
        }
    }

    #[test]
    fn geometry_is_checked_before_slenderness() {
        let error = Specimen::new("E", Proportions::Other)
            .with_dimensions(0.0, 90.0)
            .evaluate(&table())
            .expect_err("geometry rejected");
        assert!(matches!(error, SpecimenError::InvalidGeometry { .. }));
    }

    #[test]
    fn negative_load_is_rejected() {
        let error = Specimen::new("F", Proportions::Standard100x200)
            .with_load(-1.0)
            .evaluate(&table())
            .expect_err("negative load rejected");
        assert_eq!(
            error,
            SpecimenError::InvalidMeasurement {
                quantity: "load",
                value: -1.0
            }
        );
    }

    #[test]
    fn record_carries_fixed_width_failure_tag() {
        let specimen = Specimen::new("G", Proportions::Standard150x300)
            .with_mass(12.5)
            .with_load(350.0)
            .with_design_strength(21.0)
            .with_age(TestAge::TwentyEightDays)
            .with_failure(FailureMode::Type3);
        let result = specimen.evaluate(&table()).expect("valid specimen");
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date");
        let record = specimen.record(&result, date);
        assert_eq!(record.failure, "Type 3");
        assert_eq!(record.age_days, 28);
        assert_relative_eq!(record.strength_mpa, 19.81);
        assert_relative_eq!(record.density_kg_m3, 2360.0);
    }

    #[test]
    fn parses_cli_spellings() {
        assert_eq!("150x300".parse(), Ok(Proportions::Standard150x300));
        assert_eq!("Other".parse(), Ok(Proportions::Other));
        assert!("200x400".parse::<Proportions>().is_err());
        assert_eq!("4".parse(), Ok(FailureMode::Type4));
        assert!("0".parse::<FailureMode>().is_err());
        assert!("7".parse::<FailureMode>().is_err());
        assert_eq!(TestAge::from_days(28), Some(TestAge::TwentyEightDays));
        assert_eq!(TestAge::from_days(14), None);
    }
}
