//! # EVO Actuator Driver Library
//!
//! Drives a bus of actuators through the EVO coordination core: per-target
//! calibration in a [`Calibration`](evo_coord::calibration::Calibration)
//! store, commands handed to a bus worker through a preemptable slot.
//!
//! # Module Structure
//!
//! - [`actuator`] - `Actuate` trait for the physical transport, logging implementation
//! - [`command`] - Command and calibration parameter types
//! - [`config`] - Driver configuration (TOML)
//! - [`driver`] - `ActuatorDriver`, producer side and lifecycle
//! - [`error`] - Driver error type
//! - [`worker`] - Bus worker thread, consumer side of the slot
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ActuatorDriver                                              │
//! │  ┌──────────────────┐   enqueue   ┌───────────────────────┐  │
//! │  │ CompletionGuard  │────────────►│ SlotBacking (worker)  │  │
//! │  └──────────────────┘             └──────────┬────────────┘  │
//! │  ┌──────────────────┐   lookup               │               │
//! │  │ Calibration (RW) │◄───────────────────────┤               │
//! │  └──────────────────┘                        ▼               │
//! │                                  ┌───────────────────────┐   │
//! │                                  │ Actuate (trait object)│   │
//! │                                  └───────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod actuator;
pub mod command;
pub mod config;
pub mod driver;
pub mod error;
pub mod worker;

pub use crate::driver::{ActuatorDriver, OutcomeTally};
pub use crate::error::DriverError;
