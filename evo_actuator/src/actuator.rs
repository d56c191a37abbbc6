//! Transport trait for applying calibrated outputs.
//!
//! The bus protocol and physical I/O live behind [`Actuate`]; the worker
//! only knows targets and output values.

use tracing::debug;

use crate::error::DriverResult;

/// Interface to the physical actuator transport.
///
/// Called from the bus worker thread only.
pub trait Actuate: Send {
    /// Transport identifier (e.g. "logging", "flexray").
    fn name(&self) -> &'static str;

    /// Drive `target` to the calibrated `output`.
    fn apply(&mut self, target: usize, output: f64) -> DriverResult<()>;
}

/// Transport that only logs the outputs it is given.
#[derive(Debug, Default)]
pub struct LoggingActuator {
    applied: u64,
}

impl LoggingActuator {
    /// Create a new logging transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of outputs applied so far.
    pub fn applied(&self) -> u64 {
        self.applied
    }
}

impl Actuate for LoggingActuator {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn apply(&mut self, target: usize, output: f64) -> DriverResult<()> {
        self.applied += 1;
        debug!(target, output, "output applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_actuator_counts_outputs() {
        let mut actuator = LoggingActuator::new();
        actuator.apply(0, 1.0).unwrap();
        actuator.apply(3, -2.5).unwrap();
        assert_eq!(actuator.applied(), 2);
        assert_eq!(actuator.name(), "logging");
    }
}
