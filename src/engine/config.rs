//! Wrapped Operation Configuration
//!
//! Labels and log behaviour for a wrapped operation. Never affects how the
//! chains run.

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

/// Configuration for a wrapped operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapConfig {
    /// Label attached to every log event (default: "wrapped")
    #[serde(default = "default_name")]
    pub name: String,

    /// Emit a warning when an error handler suppresses an error (default: true)
    #[serde(default = "default_log_recovered")]
    pub log_recovered: bool,
}

fn default_name() -> String {
    "wrapped".to_string()
}

fn default_log_recovered() -> bool {
    true
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_recovered: default_log_recovered(),
        }
    }
}

impl WrapConfig {
    /// Create a config with the given label
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid("name must not be empty"));
        }
        Ok(())
    }
}
