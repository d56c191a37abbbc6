//! Configuration loading traits and types.
//!
//! TOML configuration shared by EVO actuator drivers. Driver crates embed
//! [`SharedConfig`] in their own config struct and load it through
//! [`ConfigLoader`]:
//!
//! ```rust,no_run
//! use evo_coord::config::{ConfigError, ConfigLoader, SharedConfig, Validate};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct BusConfig {
//!     shared: SharedConfig,
//!     target_count: usize,
//! }
//!
//! impl Validate for BusConfig {
//!     fn validate(&self) -> Result<(), ConfigError> {
//!         self.shared.validate()
//!     }
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = BusConfig::load_validated(Path::new("actuator.toml"))?;
//!     println!("{} drives {} targets", config.shared.service_name, config.target_count);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at the given path.
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Reading or TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for driver logging.
///
/// Lowercase in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-command tracing, including calibration updates.
    Trace,
    /// Consumer loop details.
    Debug,
    /// Startup, shutdown, outcome summaries.
    #[default]
    Info,
    /// Abandoned commands and degraded operation.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// `EnvFilter` directive for this level.
    pub const fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Fields common to every driver configuration.
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "evo-actuator-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Driver instance identifier.
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: "evo-actuator".to_string(),
        }
    }
}

impl Validate for SharedConfig {
    /// Rejects an empty `service_name`.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Semantic validation run after parsing.
pub trait Validate {
    /// Check the configuration for values the type system cannot rule out.
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Load configuration from TOML files.
///
/// Blanket-implemented for every `DeserializeOwned` type.
///
/// - `ConfigError::FileNotFound` if the file does not exist
/// - `ConfigError::ParseError` if it cannot be read or parsed
/// - `ConfigError::ValidationError` from [`load_validated`](Self::load_validated)
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Parse a TOML string.
    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load and parse a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound(path.display().to_string())
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        Self::from_toml(&content)
    }

    /// Load a TOML file and run [`Validate::validate`] on the result.
    fn load_validated(path: &Path) -> Result<Self, ConfigError>
    where
        Self: Validate,
    {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
