//! Simulation configuration.
//!
//! Configuration can be built in code or loaded from JSON:
//!
//! ```json
//! {
//!   "notify_unchanged": true,
//!   "log_level": "debug"
//! }
//! ```
//!
//! Every field is optional and falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid JSON for [`SimConfig`].
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration parsed but holds an invalid value.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Settings for how a circuit delivers change notifications.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Whether a write notifies subscribers even if it leaves the value unchanged.
    ///
    /// When true (the default), every write propagates, so repeated writes within
    /// one step recompute downstream components every time.
    #[serde(default = "default_notify_unchanged")]
    pub notify_unchanged: bool,

    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_notify_unchanged() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            notify_unchanged: default_notify_unchanged(),
            log_level: default_log_level(),
        }
    }
}

impl SimConfig {
    /// Loads configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let level = self.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Unknown log level: {}",
                self.log_level
            )));
        }
        if !self.notify_unchanged {
            tracing::warn!("notify_unchanged is off; writes of identical values will not propagate");
        }
        Ok(())
    }
}
