//! Laboratory configuration: where the reference tables live.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Settings resolved once at startup.
///
/// Unset paths select the tables embedded in the crate.
///
/// # Examples
/// ```
/// use concretelab::LabConfig;
///
/// let config = LabConfig::from_json(r#"{ "slenderness_table": "tables/ld.csv" }"#)?;
/// assert!(config.slenderness_table.is_some());
/// assert!(config.gradation_limits.is_none());
/// # Ok::<(), concretelab::ConfigError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabConfig {
    /// CSV file with `ratio,factor` rows.
    pub slenderness_table: Option<PathBuf>,
    /// CSV file with `size,nominal_max,sieve_mm,upper_limit,lower_limit` rows.
    pub gradation_limits: Option<PathBuf>,
}

impl LabConfig {
    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown keys.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration file. Relative table paths are resolved against the
    /// directory containing the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is not a valid configuration.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    /// Resolve relative table paths against `base`.
    #[must_use]
    pub fn relative_to(self, base: &Path) -> Self {
        let resolve = |path: PathBuf| {
            if path.is_relative() {
                base.join(path)
            } else {
                path
            }
        };
        Self {
            slenderness_table: self.slenderness_table.map(resolve),
            gradation_limits: self.gradation_limits.map(resolve),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_selects_embedded_tables() {
        let config = LabConfig::from_json("{}").expect("valid config");
        assert_eq!(config, LabConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = LabConfig::from_json(r#"{ "slendernes_table": "x.csv" }"#)
            .expect_err("typo rejected");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn relative_paths_follow_the_config_file() {
        let config = LabConfig {
            slenderness_table: Some(PathBuf::from("ld.csv")),
            gradation_limits: Some(PathBuf::from("/srv/lab/limits.csv")),
        }
        .relative_to(Path::new("/etc/lab"));
        assert_eq!(
            config.slenderness_table,
            Some(PathBuf::from("/etc/lab/ld.csv"))
        );
        assert_eq!(
            config.gradation_limits,
            Some(PathBuf::from("/srv/lab/limits.csv"))
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let error = LabConfig::from_path(Path::new("/nonexistent/lab.json"))
            .expect_err("missing file rejected");
        assert!(matches!(error, ConfigError::Io { .. }));
    }
}
