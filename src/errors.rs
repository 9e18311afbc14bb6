//! Error types produced while evaluating specimens, analysing gradations or
//! loading reference data.

use std::path::PathBuf;

use thiserror::Error;

/// Error returned when a specimen cannot be evaluated.
///
/// Geometry and slenderness are validated before any derived quantity is
/// computed, so receiving one of these variants means no partial result exists.
///
/// # Examples
///
/// ```
/// use concretelab::{CylinderGeometry, SpecimenError};
///
/// let error = CylinderGeometry::new(0.0, 200.0).expect_err("zero diameter rejected");
/// assert_eq!(
///     error,
///     SpecimenError::InvalidGeometry { diameter: 0.0, height: 200.0 }
/// );
/// ```
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum SpecimenError {
    /// Returned when the diameter or the height is zero, negative or not finite.
    #[error("invalid specimen geometry: diameter {diameter} mm, height {height} mm")]
    InvalidGeometry {
        /// Rejected diameter in millimetres.
        diameter: f64,
        /// Rejected height in millimetres.
        height: f64,
    },
    /// Returned when a specimen declared with non-standard proportions has a
    /// height/diameter ratio the correction table cannot cover.
    #[error("slenderness ratio out of range: L/D = {ratio:.2} (must be between 1.00 and 2.00)")]
    SlendernessOutOfRange {
        /// Height/diameter ratio of the specimen.
        ratio: f64,
    },
    /// Returned when a measured mass or load is negative or not finite.
    #[error("{quantity} must be a non-negative number (received {value})")]
    InvalidMeasurement {
        /// Name of the rejected measurement.
        quantity: &'static str,
        /// Rejected value.
        value: f64,
    },
}

/// Error returned when the input of a sieve analysis is malformed.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GradationError {
    /// Returned when the number of retained masses differs from the number of sieves.
    #[error("expected {sieves} retained masses, received {masses}")]
    MassCountMismatch {
        /// Number of sieves in the envelope.
        sieves: usize,
        /// Number of retained masses supplied.
        masses: usize,
    },
    /// Returned when sieve openings are not strictly decreasing.
    #[error("sieve openings must strictly decrease: {opening} mm follows {previous} mm")]
    OpeningsNotDecreasing {
        /// Opening of the preceding sieve in millimetres.
        previous: f64,
        /// Offending opening in millimetres.
        opening: f64,
    },
    /// Returned when an envelope row has its lower limit above its upper limit.
    #[error("sieve {sieve_mm} mm has lower limit {lower}% above upper limit {upper}%")]
    InvertedBand {
        /// Sieve opening in millimetres.
        sieve_mm: f64,
        /// Lower passing limit in percent.
        lower: f64,
        /// Upper passing limit in percent.
        upper: f64,
    },
    /// Returned when a retained mass is negative or not finite.
    #[error("retained mass on sieve {sieve_mm} mm must be non-negative (received {mass} g)")]
    InvalidRetainedMass {
        /// Sieve opening in millimetres.
        sieve_mm: f64,
        /// Rejected mass in grams.
        mass: f64,
    },
    /// Returned when an envelope has no sieves.
    #[error("gradation envelope has no sieves")]
    EmptyEnvelope,
    /// Returned when the requested aggregate class is not part of the envelope table.
    #[error("unknown aggregate class `{0}`")]
    UnknownClass(String),
}

/// Error returned when a reference table cannot be loaded.
///
/// Without both reference tables the engine cannot answer any query, so the
/// calling layer treats every variant as fatal at startup.
#[derive(Debug, Error)]
pub enum ReferenceDataError {
    /// Returned when a reference file cannot be opened.
    #[error("cannot read reference table {}: {source}", .path.display())]
    Io {
        /// Path of the missing or unreadable file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Returned when a reference table is not valid CSV for its schema.
    #[error("malformed reference table: {0}")]
    Csv(#[from] csv::Error),
    /// Returned when a slenderness ratio falls outside 1.00..=1.99.
    #[error("slenderness ratio {0:.2} lies outside 1.00..=1.99")]
    RatioOutsideDomain(f64),
    /// Returned when the slenderness table lacks an entry for a 0.01 step.
    #[error("slenderness table has no entry for L/D = {0:.2}")]
    MissingRatio(f64),
    /// Returned when the slenderness table lists a ratio twice.
    #[error("slenderness table lists L/D = {0:.2} more than once")]
    DuplicateRatio(f64),
    /// Returned when a correction factor is not in (0, 1].
    #[error("correction factor {factor} for L/D = {ratio:.2} must lie in (0, 1]")]
    InvalidFactor {
        /// Ratio of the offending entry.
        ratio: f64,
        /// Rejected factor.
        factor: f64,
    },
    /// Returned when the factors decrease while the ratio grows.
    #[error("correction factor decreases at L/D = {0:.2}")]
    DecreasingFactor(f64),
    /// Returned when the envelope table holds no classes.
    #[error("gradation envelope table is empty")]
    EmptyEnvelopeTable,
    /// Returned when an aggregate class in the envelope table is inconsistent.
    #[error("aggregate class `{class}` is invalid: {source}")]
    InvalidEnvelope {
        /// Label of the offending class.
        class: String,
        /// Description of the inconsistency.
        #[source]
        source: GradationError,
    },
}

/// Error returned when the laboratory configuration file cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when the configuration file cannot be read.
    #[error("cannot read configuration {}: {source}", .path.display())]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Returned when the configuration is not valid JSON for [`LabConfig`](crate::LabConfig).
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Error returned while exporting or importing results.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Returned when the CSV writer or reader fails.
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
    /// Returned when flushing the destination fails.
    #[error("cannot write export: {0}")]
    Io(#[from] std::io::Error),
    /// Returned when there is nothing to draw.
    #[error("cannot render an empty gradation")]
    EmptyChart,
    /// Returned when the chart backend fails.
    #[error("chart rendering failed: {0}")]
    Chart(String),
}
