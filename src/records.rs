//! The results collection and its CSV form.
//!
//! The engine never stores anything: callers own a [`RecordRepository`] and
//! append the records they build from evaluated specimens.

use std::io::{Read, Write};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ExportError;

/// One row of the results table, in export column order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpecimenRecord {
    /// Sample name.
    #[serde(rename = "Sample")]
    pub sample: String,
    /// Date of the test.
    #[serde(rename = "Date", with = "day_month_year")]
    pub date: NaiveDate,
    /// Age at testing in days.
    #[serde(rename = "Age (d)")]
    pub age_days: u16,
    /// Diameter in millimetres.
    #[serde(rename = "Diameter (mm)")]
    pub diameter_mm: f64,
    /// Height in millimetres.
    #[serde(rename = "Height (mm)")]
    pub height_mm: f64,
    /// Density in kg/m³.
    #[serde(rename = "Density (kg/m3)")]
    pub density_kg_m3: f64,
    /// Maximum load in kilonewtons.
    #[serde(rename = "Load (kN)")]
    pub load_kn: f64,
    /// Reported strength in MPa.
    #[serde(rename = "Strength (MPa)")]
    pub strength_mpa: f64,
    /// Strength relative to the design strength, percent.
    #[serde(rename = "Evolution (%)")]
    pub evolution_pct: f64,
    /// Fixed-width failure-mode code.
    #[serde(rename = "Failure")]
    pub failure: String,
}

/// Dates as `dd/mm/yyyy`, the format used on the laboratory sheets.
mod day_month_year {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%d/%m/%Y";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&text, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Ordered, append-only storage for results.
///
/// Records keep their insertion order and are never modified in place.
pub trait RecordRepository<T> {
    /// Add a record at the end of the collection.
    fn append(&mut self, record: T);

    /// All records in insertion order.
    fn records(&self) -> &[T];

    /// Number of stored records.
    fn len(&self) -> usize {
        self.records().len()
    }

    /// Whether nothing has been recorded yet.
    fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

/// In-memory [`RecordRepository`] for one operator session.
///
/// # Examples
/// ```
/// use concretelab::{RecordLog, RecordRepository};
///
/// let mut log = RecordLog::new();
/// log.append("first");
/// log.append("second");
/// assert_eq!(log.records(), &["first", "second"]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RecordLog<T> {
    records: Vec<T>,
}

impl<T> RecordLog<T> {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T> Default for RecordLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for RecordLog<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<T> RecordRepository<T> for RecordLog<T> {
    fn append(&mut self, record: T) {
        self.records.push(record);
    }

    fn records(&self) -> &[T] {
        &self.records
    }
}

/// Write records as CSV with a header row.
///
/// # Errors
///
/// Returns [`ExportError`] when serialization or the destination fails.
pub fn write_csv<W: Write>(records: &[SpecimenRecord], writer: W) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Read records previously written by [`write_csv`].
///
/// # Errors
///
/// Returns [`ExportError::Csv`] when a row does not match the schema.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<SpecimenRecord>, ExportError> {
    let mut csv = csv::Reader::from_reader(reader);
    let records = csv.deserialize().collect::<Result<Vec<SpecimenRecord>, _>>()?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn record(sample: &str, strength_mpa: f64) -> SpecimenRecord {
        SpecimenRecord {
            sample: sample.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 4).expect("valid date"),
            age_days: 7,
            diameter_mm: 150.2,
            height_mm: 300.0,
            density_kg_m3: 2360.0,
            load_kn: 350.0,
            strength_mpa,
            evolution_pct: 94.33,
            failure: "Type 1".to_string(),
        }
    }

    #[test]
    fn csv_has_fixed_header_and_dates() {
        let mut buffer = Vec::new();
        write_csv(&[record("M-1", 19.81)], &mut buffer).expect("export succeeds");
        let text = String::from_utf8(buffer).expect("utf-8 output");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "Sample,Date,Age (d),Diameter (mm),Height (mm),Density (kg/m3),\
                 Load (kN),Strength (MPa),Evolution (%),Failure"
            )
        );
        assert_eq!(
            lines.next(),
            Some("M-1,04/03/2026,7,150.2,300.0,2360.0,350.0,19.81,94.33,Type 1")
        );
    }

    #[test]
    fn csv_round_trip_is_lossless() {
        let records = vec![record("M-1", 19.81), record("Sample, with comma", 0.1 + 0.2)];
        let mut buffer = Vec::new();
        write_csv(&records, &mut buffer).expect("export succeeds");
        let restored = read_csv(buffer.as_slice()).expect("import succeeds");
        assert_eq!(restored, records);
    }

    #[test]
    fn log_preserves_insertion_order() {
        let mut log: RecordLog<SpecimenRecord> = RecordLog::new();
        assert!(log.is_empty());
        log.append(record("first", 10.0));
        log.append(record("second", 20.0));
        let names: Vec<&str> = log.records().iter().map(|r| r.sample.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn malformed_date_is_rejected() {
        let text = "Sample,Date,Age (d),Diameter (mm),Height (mm),Density (kg/m3),\
                    Load (kN),Strength (MPa),Evolution (%),Failure\n\
                    M-1,2026-03-04,7,150,300,2360,350,19.81,94.33,Type 1\n";
        assert!(matches!(read_csv(text.as_bytes()), Err(ExportError::Csv(_))));
    }
}
