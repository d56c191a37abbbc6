//! Completion guard: enqueue that cannot silently drop its outcome.
//!
//! [`CompletionGuard`] owns a [`Slot`] outright. Enqueuing consumes the
//! guard and returns it entangled with the command's [`Completion`], so the
//! caller gets the guard back only by waiting for the outcome, or by
//! explicitly opting out through [`CompletionGuard::enqueue_relaxed`].
//!
//! ```rust
//! use evo_coord::guard::CompletionGuard;
//! use evo_coord::slot::{channel, Completion};
//! use std::thread;
//!
//! let (slot, backing) = channel::<u32>();
//! let consumer = thread::spawn(move || {
//!     loop {
//!         if let Some(cmd) = backing.take_timeout(std::time::Duration::from_millis(10)) {
//!             break cmd.complete();
//!         }
//!     }
//! });
//!
//! let guard = CompletionGuard::new(slot);
//! let (guard, outcome) = guard.enqueue(5u32).get();
//! assert_eq!(outcome, Ok(Completion::Completed));
//! assert_eq!(consumer.join().unwrap(), 5);
//! # drop(guard);
//! ```

use std::fmt;

use crate::entangled::{Decoupled, Entangled};
use crate::slot::{Completion, Slot};

/// Exclusive owner of a command [`Slot`].
pub struct CompletionGuard<T> {
    slot: Slot<T>,
}

impl<T> CompletionGuard<T> {
    /// Take ownership of `slot`.
    pub fn new(slot: Slot<T>) -> Self {
        Self { slot }
    }

    /// Enqueue `command`, returning the guard coupled to its completion.
    pub fn enqueue(self, command: impl Into<T>) -> Entangled<Self, Completion> {
        let completion = self.slot.enqueue(command);
        Entangled::new(self, completion)
    }

    /// Enqueue `command`, returning a pair that may be split without waiting.
    pub fn enqueue_relaxed(self, command: impl Into<T>) -> Decoupled<Self, Completion> {
        let completion = self.slot.enqueue(command);
        Decoupled::new(self, completion)
    }

    /// `true` while the consumer's backing store is alive.
    pub fn is_connected(&self) -> bool {
        self.slot.is_connected()
    }
}

impl<T> From<Slot<T>> for CompletionGuard<T> {
    fn from(slot: Slot<T>) -> Self {
        Self::new(slot)
    }
}

impl<T> fmt::Debug for CompletionGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionGuard")
            .field("slot", &self.slot)
            .finish()
    }
}
