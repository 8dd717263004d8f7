//! TOML configuration
//!
//! # Example proctrack.toml
//!
//! ```toml
//! [parse]
//! ignore_trailing_incomplete = true
//!
//! [validation]
//! assert_genuine = false
//! assert_complete = true
//!
//! [report]
//! format = "json"
//! show_covariance = true
//! ```
//!
//! Every key is optional; missing keys fall back to the defaults below.

use crate::sample_set::Validation;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// JSON for machine parsing
    Json,
}

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parse: ParseConfig,
    pub validation: ValidationConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Accept a dump whose last record was cut off
    pub ignore_trailing_incomplete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    #[serde(default = "default_true")]
    pub assert_genuine: bool,
    #[serde(default = "default_true")]
    pub assert_complete: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
    pub show_covariance: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            assert_genuine: default_true(),
            assert_complete: default_true(),
        }
    }
}

impl ValidationConfig {
    pub fn validation(&self) -> Validation {
        Validation {
            assert_genuine: self.assert_genuine,
            assert_complete: self.assert_complete,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_strict() {
        let config = Config::default();
        assert!(!config.parse.ignore_trailing_incomplete);
        assert_eq!(config.validation.validation(), Validation::strict());
        assert_eq!(config.report.format, ReportFormat::Text);
        assert!(!config.report.show_covariance);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            [validation]
            assert_genuine = false

            [report]
            format = "json"
        "#,
        )
        .unwrap();
        assert!(!config.validation.assert_genuine);
        assert!(config.validation.assert_complete);
        assert_eq!(config.report.format, ReportFormat::Json);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_toml_str("[report]\nformat = \"xml\"").is_err());
        assert!(Config::from_toml_str("not toml at all [").is_err());
    }

    #[test]
    fn test_from_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[parse]\nignore_trailing_incomplete = true\n").unwrap();
        let config = Config::from_file(tmp.path()).unwrap();
        assert!(config.parse.ignore_trailing_incomplete);
        assert!(Config::from_file("/nonexistent/proctrack.toml").is_err());
    }
}
