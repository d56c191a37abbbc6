//! Error types for the actuator driver.

use evo_coord::config::ConfigError;
use thiserror::Error;

/// Errors raised by the actuator driver.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A command or calibration addressed a target outside the bus.
    #[error("Target {target} out of range (bus has {target_count} targets)")]
    TargetOutOfRange {
        /// Offending target index
        target: usize,
        /// Number of targets on the bus
        target_count: usize,
    },

    /// The transport failed to apply an output.
    #[error("Actuation failed on target {target}: {reason}")]
    Actuation {
        /// Target being driven
        target: usize,
        /// Transport-specific reason
        reason: String,
    },

    /// The bus worker thread could not be spawned.
    #[error("Failed to spawn bus worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// The bus worker thread panicked.
    #[error("Bus worker panicked")]
    WorkerPanicked,

    /// The driver has been shut down.
    #[error("Driver is stopped")]
    Stopped,
}

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
