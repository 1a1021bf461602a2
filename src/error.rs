//! Error types for loading and validating a simulation configuration.
//!
//! The simulation step itself never fails: every value it consumes is generated
//! internally from validated ranges. The only failures are a config file that
//! cannot be read or parsed, and parameters that would hang or degenerate the
//! growth loop.

use std::fmt;

/// Errors that can occur while building a [`crate::config::SimulationConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    Io(std::io::Error),
    /// The YAML document could not be parsed.
    Yaml(serde_yaml::Error),
    /// The JSON document could not be parsed.
    Json(serde_json::Error),
    /// The file extension is neither YAML nor JSON.
    UnsupportedFormat(String),
    /// A parameter is outside the range the growth algorithm can handle.
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Yaml(e) => write!(f, "Failed to parse YAML config: {}", e),
            ConfigError::Json(e) => write!(f, "Failed to parse JSON config: {}", e),
            ConfigError::UnsupportedFormat(ext) => write!(
                f,
                "Unsupported config format '{}'. Use .yaml, .yml or .json",
                ext
            ),
            ConfigError::Invalid { field, reason } => {
                write!(f, "Invalid configuration for `{}`: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Yaml(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::UnsupportedFormat(_) | ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}
