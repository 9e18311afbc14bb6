//! Reference tables: gradation envelopes per aggregate class and the bundle of
//! tables every computation reads.
//!
//! Tables are loaded once at startup and then only borrowed.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::config::LabConfig;
use crate::errors::{GradationError, ReferenceDataError};
use crate::gradation::{GradationEnvelope, SieveLimits};
use crate::slenderness::SlendernessTable;

/// Envelope table shipped with the crate.
const EMBEDDED_LIMITS: &str = include_str!("../data/gradation_limits.csv");

/// Raw row of the envelope CSV.
#[derive(Debug, Deserialize)]
struct LimitRow {
    /// Size number of the grading (`57`, `67`, ...) or a placeholder for fine aggregate.
    size: String,
    /// Nominal maximum size or description of the class.
    nominal_max: String,
    sieve_mm: f64,
    upper_limit: f64,
    lower_limit: f64,
}

impl LimitRow {
    /// Class label: `#57-25 mm` for numbered gradings, the description otherwise.
    fn class_label(&self) -> String {
        let size = self.size.trim();
        if !size.is_empty() && size.chars().all(|c| c.is_ascii_digit()) {
            format!("#{size}-{}", self.nominal_max.trim())
        } else {
            self.nominal_max.trim().to_string()
        }
    }
}

/// Gradation envelopes keyed by aggregate class, in file order.
#[derive(Clone, Debug, PartialEq)]
pub struct GradationTable {
    envelopes: Vec<GradationEnvelope>,
}

impl GradationTable {
    /// Parse an envelope table from CSV with the header
    /// `size,nominal_max,sieve_mm,upper_limit,lower_limit`.
    ///
    /// Rows of one class need not be sorted; they are ordered by descending
    /// opening before validation.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceDataError::Csv`] for malformed input,
    /// [`ReferenceDataError::EmptyEnvelopeTable`] when no rows are present and
    /// [`ReferenceDataError::InvalidEnvelope`] when a class repeats a sieve or
    /// has an inverted band.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ReferenceDataError> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut grouped: Vec<(String, Vec<SieveLimits>)> = Vec::new();
        for row in csv.deserialize::<LimitRow>() {
            let row = row?;
            let label = row.class_label();
            let limits = SieveLimits::new(row.sieve_mm, row.upper_limit, row.lower_limit);
            match grouped.iter_mut().find(|(class, _)| *class == label) {
                Some((_, sieves)) => sieves.push(limits),
                None => grouped.push((label, vec![limits])),
            }
        }
        if grouped.is_empty() {
            return Err(ReferenceDataError::EmptyEnvelopeTable);
        }

        let envelopes = grouped
            .into_iter()
            .map(|(class, mut sieves)| {
                sieves.sort_by(|a, b| b.sieve_mm.total_cmp(&a.sieve_mm));
                GradationEnvelope::new(class.clone(), sieves)
                    .map_err(|source| ReferenceDataError::InvalidEnvelope { class, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { envelopes })
    }

    /// Load an envelope table from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceDataError::Io`] when the file cannot be opened and
    /// otherwise behaves like [`GradationTable::from_reader`].
    pub fn from_path(path: &Path) -> Result<Self, ReferenceDataError> {
        let file = File::open(path).map_err(|source| ReferenceDataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Envelopes shipped with the crate: fine aggregate and coarse gradings
    /// 467, 57, 67, 7 and 8.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded data is corrupt.
    pub fn embedded() -> Result<Self, ReferenceDataError> {
        Self::from_reader(EMBEDDED_LIMITS.as_bytes())
    }

    /// Envelope of `class`.
    ///
    /// # Errors
    ///
    /// Returns [`GradationError::UnknownClass`] when the table has no such class.
    ///
    /// # Examples
    /// ```
    /// use concretelab::GradationTable;
    ///
    /// let table = GradationTable::embedded()?;
    /// let envelope = table.envelope("#57-25 mm")?;
    /// assert_eq!(envelope.sieves().len(), 5);
    /// assert!(table.envelope("#99-1 mm").is_err());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn envelope(&self, class: &str) -> Result<&GradationEnvelope, GradationError> {
        self.envelopes
            .iter()
            .find(|envelope| envelope.class() == class)
            .ok_or_else(|| GradationError::UnknownClass(class.to_string()))
    }

    /// Class labels in table order.
    pub fn classes(&self) -> impl Iterator<Item = &str> + '_ {
        self.envelopes.iter().map(GradationEnvelope::class)
    }

    /// All envelopes in table order.
    #[must_use]
    pub fn envelopes(&self) -> &[GradationEnvelope] {
        &self.envelopes
    }
}

/// Every reference table the engine needs, loaded once.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceData {
    /// Slenderness correction factors.
    pub slenderness: SlendernessTable,
    /// Gradation envelopes.
    pub gradation: GradationTable,
}

impl ReferenceData {
    /// Load the tables named in `config`, falling back to the embedded tables
    /// for paths that are not set.
    ///
    /// # Errors
    ///
    /// Returns the first [`ReferenceDataError`] raised by either table.
    pub fn load(config: &LabConfig) -> Result<Self, ReferenceDataError> {
        let slenderness = match &config.slenderness_table {
            Some(path) => SlendernessTable::from_path(path)?,
            None => SlendernessTable::embedded()?,
        };
        let gradation = match &config.gradation_limits {
            Some(path) => GradationTable::from_path(path)?,
            None => GradationTable::embedded()?,
        };
        Ok(Self {
            slenderness,
            gradation,
        })
    }

    /// Both embedded tables.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded data is corrupt.
    pub fn embedded() -> Result<Self, ReferenceDataError> {
        Self::load(&LabConfig::default())
    }
}
