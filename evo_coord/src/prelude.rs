//! Prelude module for common re-exports.
//!
//! ```rust
//! use evo_coord::prelude::*;
//! ```

// ─── Calibration ────────────────────────────────────────────────────
pub use crate::calibration::{Calibration, ParameterGroup};
pub use crate::target_set::{DynTargetSet, TargetOutOfRange, TargetSet};

// ─── Command Slot ───────────────────────────────────────────────────
pub use crate::entangled::{Decoupled, Entangled};
pub use crate::guard::CompletionGuard;
pub use crate::oneshot::{Abandoned, Deferred, DeferredStatus, Promise, oneshot};
pub use crate::slot::{Completion, PendingCommand, Slot, SlotBacking, channel};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig, Validate};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::MAX_TARGETS;
