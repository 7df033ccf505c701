//! Comparison settings and the JSON config file

use crate::error::{CelldiffError, Result};
use crate::loader::LoadOptions;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default glob for files to compare
pub const DEFAULT_PATTERN: &str = "*.csv";

/// What to do when a file exists in neither tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingBothPolicy {
    /// Report it as an outcome and keep going
    #[default]
    Report,
    /// Fail the comparison
    Error,
}

/// Report format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("Invalid output format: {}. Use 'pretty', 'json' or 'csv'", s)),
        }
    }
}

/// Everything a directory comparison needs besides the two roots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    pub pattern: String,
    pub load: LoadOptions,
    pub missing_both: MissingBothPolicy,
    pub jobs: usize,
    pub format: OutputFormat,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            load: LoadOptions::default(),
            missing_both: MissingBothPolicy::default(),
            jobs: 1,
            format: OutputFormat::default(),
        }
    }
}

impl CompareConfig {
    /// Read a JSON config file; absent keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(CelldiffError::config("jobs must be greater than 0"));
        }
        if self.pattern.is_empty() {
            return Err(CelldiffError::config("file pattern must not be empty"));
        }
        self.load.validate()
    }
}
