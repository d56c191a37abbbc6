//! Driver configuration.
//!
//! ```toml
//! target_count = 8
//! apply_time_ms = 2
//! poll_interval_ms = 10
//!
//! [shared]
//! log_level = "info"
//! service_name = "evo-actuator-arm"
//!
//! [[calibration]]
//! targets = [0, 1, 2, 3]
//! gain = 1.5
//!
//! [[calibration]]
//! targets = [2]
//! gain = 2.0
//! offset = -0.1
//! ```
//!
//! Calibration entries are applied in file order, so later entries override
//! earlier ones for the targets they share.

use std::path::Path;
use std::time::Duration;

use evo_coord::config::{ConfigError, ConfigLoader, SharedConfig, Validate};
use evo_coord::consts::{
    DEFAULT_APPLY_TIME_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TARGET_COUNT, MAX_TARGETS,
};
use evo_coord::target_set::{DynTargetSet, TargetSet};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::command::ActuatorParams;

fn default_target_count() -> usize {
    DEFAULT_TARGET_COUNT
}

fn default_apply_time_ms() -> u64 {
    DEFAULT_APPLY_TIME_MS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn unit_gain() -> f64 {
    1.0
}

/// One `[[calibration]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationEntry {
    /// Target indices the parameters apply to.
    pub targets: DynTargetSet,
    /// Setpoint scale.
    #[serde(default = "unit_gain")]
    pub gain: f64,
    /// Offset added after scaling.
    #[serde(default)]
    pub offset: f64,
}

impl CalibrationEntry {
    /// Parameters carried by this entry.
    pub fn params(&self) -> ActuatorParams {
        ActuatorParams {
            gain: self.gain,
            offset: self.offset,
        }
    }
}

/// Actuator driver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Common service fields.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Number of targets on the bus (`1..=MAX_TARGETS`).
    #[serde(default = "default_target_count")]
    pub target_count: usize,

    /// Time the transport needs to apply one command, in milliseconds.
    #[serde(default = "default_apply_time_ms")]
    pub apply_time_ms: u64,

    /// Bus worker wake-up interval while the slot is empty, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Initial calibration, applied in order.
    #[serde(default)]
    pub calibration: Vec<CalibrationEntry>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            target_count: DEFAULT_TARGET_COUNT,
            apply_time_ms: DEFAULT_APPLY_TIME_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            calibration: Vec::new(),
        }
    }
}

impl DriverConfig {
    /// Load and validate `path`, or fall back to defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply time as a `Duration`.
    pub fn apply_time(&self) -> Duration {
        Duration::from_millis(self.apply_time_ms)
    }

    /// Poll interval as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Validate for DriverConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.target_count == 0 || self.target_count > MAX_TARGETS {
            return Err(ConfigError::ValidationError(format!(
                "target_count must be in 1..={MAX_TARGETS}, got {}",
                self.target_count
            )));
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be > 0".to_string(),
            ));
        }

        for (i, entry) in self.calibration.iter().enumerate() {
            if entry.targets.is_none() {
                warn!("calibration entry {i} has no targets and is ignored");
            }
            if let Some(target) = entry.targets.members().find(|&t| t >= self.target_count) {
                return Err(ConfigError::ValidationError(format!(
                    "calibration entry {i}: target {target} >= target_count {}",
                    self.target_count
                )));
            }
            if !entry.gain.is_finite() || !entry.offset.is_finite() {
                return Err(ConfigError::ValidationError(format!(
                    "calibration entry {i}: gain and offset must be finite"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evo_coord::config::LogLevel;

    #[test]
    fn defaults_are_valid() {
        let config = DriverConfig::load_or_default(None).unwrap();
        assert_eq!(config.target_count, DEFAULT_TARGET_COUNT);
        assert_eq!(config.poll_interval(), Duration::from_millis(DEFAULT_POLL_INTERVAL_MS));
        assert!(config.calibration.is_empty());
    }

    #[test]
    fn parses_calibration_entries() {
        let config = DriverConfig::from_toml(
            r#"target_count = 4

[shared]
log_level = "debug"
service_name = "evo-actuator-test"

[[calibration]]
targets = [0, 1, 2]
gain = 1.5

[[calibration]]
targets = [3]
offset = -0.5
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.shared.log_level, LogLevel::Debug);
        assert_eq!(config.apply_time_ms, DEFAULT_APPLY_TIME_MS);
        assert_eq!(config.calibration.len(), 2);
        assert_eq!(config.calibration[0].targets, DynTargetSet::from_bits(0b0111));
        assert_eq!(
            config.calibration[1].params(),
            ActuatorParams {
                gain: 1.0,
                offset: -0.5
            }
        );
    }

    #[test]
    fn rejects_out_of_range_calibration_target() {
        let config = DriverConfig::from_toml(
            r#"target_count = 2

[[calibration]]
targets = [0, 5]
"#,
        )
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(msg)) if msg.contains("target 5")
        ));
    }

    #[test]
    fn huge_calibration_target_is_a_parse_error() {
        let result = DriverConfig::from_toml(
            r#"[[calibration]]
targets = [9223372036854775807]
"#,
        );

        assert!(matches!(
            result,
            Err(ConfigError::ParseError(msg)) if msg.contains("out of range")
        ));
    }

    #[test]
    fn rejects_target_count_limits() {
        let mut config = DriverConfig {
            target_count: 0,
            ..DriverConfig::default()
        };
        assert!(config.validate().is_err());

        config.target_count = MAX_TARGETS + 1;
        assert!(config.validate().is_err());

        config.target_count = MAX_TARGETS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let config = DriverConfig {
            poll_interval_ms: 0,
            ..DriverConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
