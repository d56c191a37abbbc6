//! Single-slot, preemptable command channel.
//!
//! [`channel`] splits a command cell into a producer [`Slot`] and the
//! [`SlotBacking`] that owns the cell. The slot only points into the
//! backing store; whoever owns the backing store (the consumer) decides how
//! long the cell lives.
//!
//! The cell holds at most one pending command. Enqueuing while a command is
//! still pending resolves the older command's completion with
//! [`Completion::Preempted`] before it is replaced. The consumer takes a
//! [`PendingCommand`] out of the cell and resolves it with
//! [`PendingCommand::complete`]. A taken command can no longer be
//! preempted.
//!
//! ```rust
//! use evo_coord::slot::{channel, Completion};
//!
//! let (slot, backing) = channel::<u32>();
//! let first = slot.enqueue(1u32);
//! let second = slot.enqueue(2u32);
//! assert_eq!(first.wait(), Ok(Completion::Preempted));
//!
//! let pending = backing.try_take().unwrap();
//! assert_eq!(*pending, 2);
//! pending.complete();
//! assert_eq!(second.wait(), Ok(Completion::Completed));
//! ```
//!
//! Dropping the backing store abandons any command still in the cell, and
//! commands enqueued after that are abandoned immediately.

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

use crate::oneshot::{Abandoned, Deferred, Promise, oneshot};

/// Terminal outcome of an enqueued command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Completion {
    /// The consumer applied the command.
    Completed,
    /// A newer command replaced it before the consumer took it.
    Preempted,
}

impl Completion {
    /// Collapse an observed outcome for control flow.
    ///
    /// Abandonment is treated as [`Completion::Preempted`] but logged as a
    /// warning: either the consumer dropped the command it took without
    /// completing it, or the backing store was torn down with the command
    /// still in the cell.
    pub fn resolve(outcome: Result<Completion, Abandoned>) -> Completion {
        match outcome {
            Ok(completion) => completion,
            Err(Abandoned) => {
                warn!(
                    "command abandoned before completion (consumer dropped it or backing store torn down)"
                );
                Completion::Preempted
            }
        }
    }
}

struct Cell<T> {
    pending: Mutex<Option<(Promise<Completion>, T)>>,
    arrived: Condvar,
}

/// Create a slot and the backing store it points into.
pub fn channel<T>() -> (Slot<T>, SlotBacking<T>) {
    let cell = Arc::new(Cell {
        pending: Mutex::new(None),
        arrived: Condvar::new(),
    });
    (
        Slot {
            cell: Arc::downgrade(&cell),
        },
        SlotBacking { cell },
    )
}

/// Producer handle of a command cell.
///
/// Move-only: there is exactly one producer ticket per cell.
pub struct Slot<T> {
    cell: Weak<Cell<T>>,
}

impl<T> Slot<T> {
    /// Hand `command` to the consumer, preempting any command still pending.
    ///
    /// The returned deferred resolves exactly once: `Completed` when the
    /// consumer completes the command, `Preempted` when a later enqueue
    /// replaces it first, or abandoned when the backing store goes away.
    pub fn enqueue(&self, command: impl Into<T>) -> Deferred<Completion> {
        let (promise, completion) = oneshot();
        let Some(cell) = self.cell.upgrade() else {
            debug!("slot backing store dropped, command abandoned");
            return completion;
        };

        let command = command.into();
        {
            let mut pending = cell.pending.lock();
            if let Some((preempted, _)) = pending.replace((promise, command)) {
                trace!("pending command preempted");
                preempted.set(Completion::Preempted);
            }
        }
        cell.arrived.notify_one();

        completion
    }

    /// `true` while the backing store is alive.
    pub fn is_connected(&self) -> bool {
        self.cell.strong_count() > 0
    }
}

impl<T> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Consumer side of a command cell; owns the cell.
pub struct SlotBacking<T> {
    cell: Arc<Cell<T>>,
}

impl<T> SlotBacking<T> {
    /// Take the pending command, if any, without blocking.
    pub fn try_take(&self) -> Option<PendingCommand<T>> {
        self.cell.pending.lock().take().map(PendingCommand::new)
    }

    /// Wait up to `timeout` for a command and take it.
    pub fn take_timeout(&self, timeout: Duration) -> Option<PendingCommand<T>> {
        let deadline = Instant::now() + timeout;
        let mut pending = self.cell.pending.lock();
        while pending.is_none() {
            if self.cell.arrived.wait_until(&mut pending, deadline).timed_out() {
                break;
            }
        }
        pending.take().map(PendingCommand::new)
    }

    /// `true` when a command is waiting to be taken.
    pub fn is_pending(&self) -> bool {
        self.cell.pending.lock().is_some()
    }

    /// `true` while the producer [`Slot`] exists.
    pub fn has_producer(&self) -> bool {
        Arc::weak_count(&self.cell) > 0
    }
}

impl<T> fmt::Debug for SlotBacking<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotBacking")
            .field("pending", &self.is_pending())
            .field("has_producer", &self.has_producer())
            .finish()
    }
}

/// A command taken out of the cell, awaiting completion.
///
/// Dropping it without calling [`complete`](Self::complete) abandons the
/// producer's completion.
pub struct PendingCommand<T> {
    promise: Promise<Completion>,
    command: T,
}

impl<T> PendingCommand<T> {
    fn new((promise, command): (Promise<Completion>, T)) -> Self {
        Self { promise, command }
    }

    /// The command payload.
    pub fn command(&self) -> &T {
        &self.command
    }

    /// Resolve the command as `Completed` and return its payload.
    pub fn complete(self) -> T {
        self.promise.set(Completion::Completed);
        self.command
    }
}

impl<T> Deref for PendingCommand<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.command
    }
}

impl<T: fmt::Debug> fmt::Debug for PendingCommand<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCommand")
            .field("command", &self.command)
            .finish()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
