//! Strength correction for specimens whose height/diameter ratio departs from 2.
//!
//! The table is an exact-match lookup keyed by the ratio rounded to two
//! decimals. Values between keys are never interpolated at runtime: a specimen
//! with L/D = 1.234 is corrected with the factor stored for 1.23.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ReferenceDataError;

/// Smallest ratio covered by the table, in hundredths.
const FIRST_KEY: u16 = 100;
/// Largest ratio covered by the table, in hundredths.
const LAST_KEY: u16 = 199;

/// Correction table shipped with the crate.
const EMBEDDED_TABLE: &str = include_str!("../data/slenderness_factors.csv");

/// One row of the slenderness table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlendernessEntry {
    /// Height/diameter ratio with two decimals.
    pub ratio: f64,
    /// Dimensionless factor applied to the raw strength.
    pub factor: f64,
}

/// Ratio expressed in hundredths, i.e. `round(ratio, 2) * 100`.
fn ratio_key(ratio: f64) -> i64 {
    // Saturating cast; out-of-domain ratios are rejected by the callers.
    (ratio * 100.0).round() as i64
}

/// Round a ratio to the two decimals used as table keys.
#[must_use]
pub fn rounded_ratio(ratio: f64) -> f64 {
    crate::strength::round_to(ratio, 2)
}

/// Validated lookup from L/D ratio to correction factor over `1.00..=1.99`.
#[derive(Clone, Debug, PartialEq)]
pub struct SlendernessTable {
    factors: BTreeMap<u16, f64>,
}

impl SlendernessTable {
    /// Build a table from its entries.
    ///
    /// # Errors
    ///
    /// Returns a [`ReferenceDataError`] when an entry lies outside the domain,
    /// a ratio repeats, a 0.01 step is missing, a factor is not in `(0, 1]`
    /// or the factors decrease as the ratio grows.
    pub fn from_entries<I>(entries: I) -> Result<Self, ReferenceDataError>
    where
        I: IntoIterator<Item = SlendernessEntry>,
    {
        let mut factors = BTreeMap::new();
        for entry in entries {
            let key = ratio_key(entry.ratio);
            if !(i64::from(FIRST_KEY)..=i64::from(LAST_KEY)).contains(&key) {
                return Err(ReferenceDataError::RatioOutsideDomain(entry.ratio));
            }
            if !(entry.factor.is_finite() && entry.factor > 0.0 && entry.factor <= 1.0) {
                return Err(ReferenceDataError::InvalidFactor {
                    ratio: entry.ratio,
                    factor: entry.factor,
                });
            }
            // The range check above guarantees the key fits.
            let key = key as u16;
            if factors.insert(key, entry.factor).is_some() {
                return Err(ReferenceDataError::DuplicateRatio(entry.ratio));
            }
        }

        let mut previous: Option<f64> = None;
        for key in FIRST_KEY..=LAST_KEY {
            let ratio = f64::from(key) / 100.0;
            let factor = *factors
                .get(&key)
                .ok_or(ReferenceDataError::MissingRatio(ratio))?;
            if previous.is_some_and(|previous| factor < previous) {
                return Err(ReferenceDataError::DecreasingFactor(ratio));
            }
            previous = Some(factor);
        }

        Ok(Self { factors })
    }

    /// Parse a table from CSV with a `ratio,factor` header.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceDataError::Csv`] for malformed input and the
    /// validation errors of [`SlendernessTable::from_entries`].
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ReferenceDataError> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let entries = csv
            .deserialize::<SlendernessEntry>()
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_entries(entries)
    }

    /// Load a table from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceDataError::Io`] when the file cannot be opened and
    /// otherwise behaves like [`SlendernessTable::from_reader`].
    pub fn from_path(path: &Path) -> Result<Self, ReferenceDataError> {
        let file = File::open(path).map_err(|source| ReferenceDataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// The table shipped with the crate: 0.87 at L/D 1.00, 0.93 at 1.25,
    /// 0.96 at 1.50 and 0.98 at 1.75, filled linearly towards 1.00 at L/D 2.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded data is corrupt.
    ///
    /// # Examples
    /// ```
    /// use concretelab::SlendernessTable;
    ///
    /// let table = SlendernessTable::embedded()?;
    /// assert_eq!(table.factor(1.0), Some(0.87));
    /// assert_eq!(table.factor(1.75), Some(0.98));
    /// assert_eq!(table.factor(2.0), None);
    /// # Ok::<(), concretelab::ReferenceDataError>(())
    /// ```
    pub fn embedded() -> Result<Self, ReferenceDataError> {
        Self::from_reader(EMBEDDED_TABLE.as_bytes())
    }

    /// Correction factor for `ratio`.
    ///
    /// Returns `None` outside `1.00..=1.99`, including the standard ratio 2.00
    /// for which no correction applies.
    #[must_use]
    pub fn factor(&self, ratio: f64) -> Option<f64> {
        if !(1.0..=1.99).contains(&ratio) {
            return None;
        }
        u16::try_from(ratio_key(ratio))
            .ok()
            .and_then(|key| self.factors.get(&key).copied())
    }

    /// Entries in ascending ratio order.
    pub fn entries(&self) -> impl Iterator<Item = SlendernessEntry> + '_ {
        self.factors.iter().map(|(&key, &factor)| SlendernessEntry {
            ratio: f64::from(key) / 100.0,
            factor,
        })
    }

    /// Number of entries, always 100 for a validated table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Whether the table has no entries; never true for a validated table.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}
