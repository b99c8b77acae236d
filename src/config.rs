//! Conversion options and their TOML loading logic.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Options controlling which extensions run during parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Options {
    /// Recognize grid tables. On by default.
    pub grid_tables: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { grid_tables: true }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file at {path}: {source}")]
    IoError { source: io::Error, path: String },

    /// Failed to parse the configuration content
    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

impl Options {
    /// Loads options from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            source,
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::ParseError(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert!(Options::default().grid_tables);
        assert_eq!(Options::from_toml("").unwrap(), Options::default());
    }

    #[test]
    fn test_kebab_case_keys() {
        let options = Options::from_toml("grid-tables = false").unwrap();
        assert!(!options.grid_tables);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let options = Options::from_toml("future-flag = 1\ngrid-tables = true").unwrap();
        assert!(options.grid_tables);
    }

    #[test]
    fn test_type_mismatch_is_a_parse_error() {
        let err = Options::from_toml("grid-tables = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = Options::load("/nonexistent/gridmark.toml").unwrap_err();
        match err {
            ConfigError::IoError { path, .. } => {
                assert!(path.contains("gridmark.toml"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
