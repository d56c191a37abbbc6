//! EVO Coordination Core
//!
//! Two independent primitives embedded by EVO actuator drivers:
//!
//! - a parameter override store that folds overlapping per-target writes
//!   into a minimal set of disjoint assignments, and
//! - a single-slot, preemptable command channel whose producer learns
//!   whether each command completed or was preempted.
//!
//! # Module Structure
//!
//! - [`target_set`] - Bitmask trait and the dynamic target set
//! - [`calibration`] - Parameter override store
//! - [`oneshot`] - One-shot promise/deferred pair
//! - [`slot`] - Preemptable command slot and its consumer side
//! - [`entangled`] - Strict and relaxed now/later pairs
//! - [`guard`] - Completion guard over a slot
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Limits and defaults
//! - [`prelude`] - Common re-exports
//!
//! # Data Flow
//!
//! ```text
//!  driver ── Calibration::set(targets, params) ──► disjoint groups
//!
//!  producer ── CompletionGuard::enqueue(cmd) ──► Slot ──► cell ◄── SlotBacking::take ── consumer
//!      ▲                                                                   │
//!      └──────── Entangled<guard, Completion> ◄── Completed / Preempted ───┘
//! ```

#![deny(missing_docs)]

pub mod calibration;
pub mod config;
pub mod consts;
pub mod entangled;
pub mod guard;
pub mod oneshot;
pub mod prelude;
pub mod slot;
pub mod target_set;
