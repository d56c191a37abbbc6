//! Values available now, coupled to an outcome available later.
//!
//! [`Entangled`] holds a `now` value whose use may affect when (or whether)
//! `later` resolves. It only hands out `now` together with the resolved
//! `later`, so a caller cannot observe one without committing to wait for
//! the other.
//!
//! [`Decoupled`] is the relaxed variant. Its [`unsafe_get`](Decoupled::unsafe_get)
//! separates the two immediately and leaves the causal ordering to the
//! caller. The strict type has no such accessor:
//!
//! ```compile_fail
//! use evo_coord::entangled::Entangled;
//! use evo_coord::oneshot::oneshot;
//!
//! let (_promise, later) = oneshot::<u32>();
//! let pair = Entangled::new(1u8, later);
//! let (_now, _later) = pair.unsafe_get();
//! ```
//!
//! "Unsafe" here is about ordering, not memory safety.

use std::time::Duration;

use crate::oneshot::{Abandoned, Deferred, DeferredStatus};

/// Strictly coupled `now`/`later` pair.
#[must_use = "dropping an Entangled pair discards the pending outcome"]
#[derive(Debug)]
pub struct Entangled<Now, Later> {
    now: Now,
    later: Deferred<Later>,
}

impl<Now, Later> Entangled<Now, Later> {
    /// Couple `now` to the deferred `later`.
    pub fn new(now: Now, later: Deferred<Later>) -> Self {
        Self { now, later }
    }

    /// Poll `later` without blocking.
    pub fn status(&self) -> DeferredStatus {
        self.later.status()
    }
}

impl<Now, Later: Clone> Entangled<Now, Later> {
    /// Block until `later` resolves, then return both values.
    pub fn get(self) -> (Now, Result<Later, Abandoned>) {
        let later = self.later.wait();
        (self.now, later)
    }

    /// Like [`get`](Self::get), but give the pair back if `later` is still
    /// unresolved after `timeout`.
    pub fn get_timeout(self, timeout: Duration) -> Result<(Now, Result<Later, Abandoned>), Self> {
        match self.later.wait_timeout(timeout) {
            DeferredStatus::NotReady => Err(self),
            DeferredStatus::Ready | DeferredStatus::Abandoned => Ok(self.get()),
        }
    }
}

/// Relaxed `now`/`later` pair that may be split without waiting.
#[must_use = "dropping a Decoupled pair discards the pending outcome"]
#[derive(Debug)]
pub struct Decoupled<Now, Later> {
    now: Now,
    later: Deferred<Later>,
}

impl<Now, Later> Decoupled<Now, Later> {
    /// Pair `now` with the deferred `later`.
    pub fn new(now: Now, later: Deferred<Later>) -> Self {
        Self { now, later }
    }

    /// Poll `later` without blocking.
    pub fn status(&self) -> DeferredStatus {
        self.later.status()
    }

    /// Split the pair immediately.
    ///
    /// The caller becomes responsible for not acting on `now` as if `later`
    /// had resolved.
    pub fn unsafe_get(self) -> (Now, Deferred<Later>) {
        (self.now, self.later)
    }
}

impl<Now, Later: Clone> Decoupled<Now, Later> {
    /// Block until `later` resolves, then return both values.
    pub fn get(self) -> (Now, Result<Later, Abandoned>) {
        let later = self.later.wait();
        (self.now, later)
    }
}
