/// Engine configuration
///
/// Holds the settings the lifecycle needs beyond the store and the clock:
/// which UTC offset defines a calendar day for the owner, and how many habit
/// updates the missed-window sweep may have in flight at once.

use std::path::Path;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Westmost supported offset (UTC-12:00), in minutes
const MIN_OFFSET_MINUTES: i32 = -12 * 60;

/// Eastmost supported offset (UTC+14:00), in minutes
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for a `HabitLifecycle`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Owner's offset from UTC in minutes; day boundaries are local midnight
    pub utc_offset_minutes: i32,
    /// Maximum number of concurrent habit updates during a sweep
    pub sweep_concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            sweep_concurrency: 8,
        }
    }
}

impl EngineConfig {
    /// Parse and validate configuration from a JSON document
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        tracing::info!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&self.utc_offset_minutes) {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_minutes must be between {} and {}, got {}",
                MIN_OFFSET_MINUTES, MAX_OFFSET_MINUTES, self.utc_offset_minutes
            )));
        }

        if self.sweep_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "sweep_concurrency must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// The configured offset as a chrono `FixedOffset`
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "utc_offset_minutes {} is not a valid offset",
                self.utc_offset_minutes
            ))
        })
    }
}
