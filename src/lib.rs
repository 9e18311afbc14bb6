#![warn(clippy::all)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod chart;
pub mod config;
pub mod cubes;
pub mod errors;
pub mod geometry;
pub mod gradation;
pub mod records;
pub mod reference;
pub mod slenderness;
pub mod specimen;
pub mod strength;

#[cfg(feature = "chart")]
pub use chart::render_png;
pub use chart::ChartData;
pub use config::LabConfig;
pub use cubes::{
    cube_strength_mpa, summarize, write_cubes_csv, CementType, CubeSeries, CubeSummary,
    MortarCube, CUBE_AREA_MM2,
};
pub use errors::{ConfigError, ExportError, GradationError, ReferenceDataError, SpecimenError};
pub use geometry::{area_mm2, volume_m3, CylinderGeometry, GeometryResult};
pub use gradation::{
    analyze, BandStatus, GradationEnvelope, GradationResult, GradationWarning, SieveLimits,
    SieveResult, SieveRow,
};
pub use records::{read_csv, write_csv, RecordLog, RecordRepository, SpecimenRecord};
pub use reference::{GradationTable, ReferenceData};
pub use slenderness::{SlendernessEntry, SlendernessTable};
pub use specimen::{slenderness_factor, FailureMode, Proportions, Specimen, TestAge};
pub use strength::{
    compressive_strength_mpa, corrected_strength_mpa, density_kg_m3, evolution_pct, round_to,
    StrengthResult,
};
