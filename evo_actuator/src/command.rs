//! Command and calibration parameter types.

use evo_coord::target_set::DynTargetSet;
use serde::{Deserialize, Serialize};

/// Linear calibration of one actuator: `output = setpoint * gain + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuatorParams {
    /// Scale applied to the setpoint.
    pub gain: f64,
    /// Offset added after scaling.
    pub offset: f64,
}

impl Default for ActuatorParams {
    fn default() -> Self {
        Self {
            gain: 1.0,
            offset: 0.0,
        }
    }
}

impl ActuatorParams {
    /// Calibrated output for `setpoint`.
    #[inline]
    pub fn output(&self, setpoint: f64) -> f64 {
        setpoint * self.gain + self.offset
    }
}

/// Setpoint for a set of targets.
#[derive(Debug, Clone, PartialEq)]
pub struct ActuatorCommand {
    /// Targets to drive.
    pub targets: DynTargetSet,
    /// Raw setpoint, calibrated per target before it reaches the bus.
    pub setpoint: f64,
}

impl ActuatorCommand {
    /// Create a command driving `targets` to `setpoint`.
    pub fn new(targets: DynTargetSet, setpoint: f64) -> Self {
        Self { targets, setpoint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_identity() {
        assert_eq!(ActuatorParams::default().output(3.5), 3.5);
    }

    #[test]
    fn output_applies_gain_then_offset() {
        let params = ActuatorParams {
            gain: 2.0,
            offset: 1.0,
        };
        assert_eq!(params.output(3.0), 7.0);
    }
}
