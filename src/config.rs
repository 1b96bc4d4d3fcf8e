//! Service configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Configuration of the analytics service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Path of the cleaned event log CSV written by the ETL collaborator.
    pub event_log_path: PathBuf,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            event_log_path: PathBuf::from("data/processed/orchid_event_log.csv"),
        }
    }
}

impl AnalyticsConfig {
    /// Load the configuration from a TOML file.
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}
