//! One-shot promise/deferred pair.
//!
//! A [`Promise`] is written at most once. Every clone of the matching
//! [`Deferred`] can observe the value, blocking until it is available.
//! Dropping an unresolved promise leaves the cell [`Abandoned`], which
//! wakes all waiters instead of leaving them blocked forever.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use thiserror::Error;

/// The promise was dropped before a value was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("promise abandoned before it was resolved")]
pub struct Abandoned;

/// Non-blocking view of a [`Deferred`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredStatus {
    /// A value is available.
    Ready,
    /// Still waiting for the promise.
    NotReady,
    /// The promise was dropped; no value will ever arrive.
    Abandoned,
}

enum State<T> {
    Pending,
    Ready(T),
    Abandoned,
}

impl<T> State<T> {
    fn status(&self) -> DeferredStatus {
        match self {
            State::Pending => DeferredStatus::NotReady,
            State::Ready(_) => DeferredStatus::Ready,
            State::Abandoned => DeferredStatus::Abandoned,
        }
    }
}

struct Shared<T> {
    state: Mutex<State<T>>,
    resolved: Condvar,
}

impl<T> Shared<T> {
    fn resolve(&self, next: State<T>) {
        let mut state = self.state.lock();
        if matches!(*state, State::Pending) {
            *state = next;
        }
        drop(state);
        self.resolved.notify_all();
    }
}

/// Create a connected promise/deferred pair.
pub fn oneshot<T>() -> (Promise<T>, Deferred<T>) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State::Pending),
        resolved: Condvar::new(),
    });
    (
        Promise {
            shared: Some(Arc::clone(&shared)),
        },
        Deferred { shared },
    )
}

/// Write side of a one-shot cell.
pub struct Promise<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> Promise<T> {
    /// Resolve the cell with `value` and wake all waiters.
    pub fn set(mut self, value: T) {
        if let Some(shared) = self.shared.take() {
            shared.resolve(State::Ready(value));
        }
    }
}

impl<T> Drop for Promise<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.resolve(State::Abandoned);
        }
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise").finish_non_exhaustive()
    }
}

/// Read side of a one-shot cell. Cloning shares the same cell.
pub struct Deferred<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Deferred<T> {
    /// Query the cell without blocking.
    pub fn status(&self) -> DeferredStatus {
        self.shared.state.lock().status()
    }

    /// Block for at most `timeout` and report the resulting status.
    pub fn wait_timeout(&self, timeout: Duration) -> DeferredStatus {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        while matches!(*state, State::Pending) {
            if self.shared.resolved.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        state.status()
    }

    fn block(&self) -> MutexGuard<'_, State<T>> {
        let mut state = self.shared.state.lock();
        while matches!(*state, State::Pending) {
            self.shared.resolved.wait(&mut state);
        }
        state
    }
}

impl<T: Clone> Deferred<T> {
    /// Block until the promise is resolved or abandoned.
    pub fn wait(&self) -> Result<T, Abandoned> {
        match &*self.block() {
            State::Ready(value) => Ok(value.clone()),
            _ => Err(Abandoned),
        }
    }
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("status", &self.status())
            .finish()
    }
}
