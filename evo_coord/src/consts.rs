//! System-wide constants for the coordination core.
//!
//! Single source of truth for target limits and driver defaults.

use static_assertions::const_assert;

/// Maximum number of addressable targets (motors) on one actuator bus.
pub const MAX_TARGETS: usize = 128;

/// Bits per storage word of [`DynTargetSet`](crate::target_set::DynTargetSet).
pub const TARGET_WORD_BITS: usize = u64::BITS as usize;

/// Default number of targets driven when no configuration is given.
pub const DEFAULT_TARGET_COUNT: usize = 16;

/// Default consumer poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Default simulated command application time in milliseconds.
pub const DEFAULT_APPLY_TIME_MS: u64 = 2;

/// Default actuator driver configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/evo/actuator.toml";

// A `u128` mask must be able to address the whole bus.
const_assert!(MAX_TARGETS <= u128::BITS as usize);
const_assert!(MAX_TARGETS % TARGET_WORD_BITS == 0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_consistent() {
        assert!(MAX_TARGETS > 0);
        assert!(DEFAULT_TARGET_COUNT > 0 && DEFAULT_TARGET_COUNT <= MAX_TARGETS);
        assert!(DEFAULT_POLL_INTERVAL_MS > 0);
        assert!(DEFAULT_CONFIG_PATH.ends_with(".toml"));
    }

    #[test]
    fn bus_fits_in_dyn_words() {
        // DynTargetSet for a full bus uses MAX_TARGETS / 64 words.
        assert_eq!(MAX_TARGETS / TARGET_WORD_BITS, 2);
    }
}
