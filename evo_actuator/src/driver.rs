//! Actuator driver: producer side and lifecycle.
//!
//! [`ActuatorDriver`] owns the calibration store and the completion guard
//! of the command slot, and spawns the bus [`Worker`] that owns the slot's
//! backing store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use evo_coord::calibration::{Calibration, ParameterGroup};
use evo_coord::config::Validate;
use evo_coord::guard::CompletionGuard;
use evo_coord::oneshot::{Abandoned, Deferred};
use evo_coord::slot::{Completion, channel};
use evo_coord::target_set::{DynTargetSet, TargetSet};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::actuator::Actuate;
use crate::command::{ActuatorCommand, ActuatorParams};
use crate::config::DriverConfig;
use crate::error::{DriverError, DriverResult};
use crate::worker::{SharedCalibration, Worker, WorkerStats};

/// Name of the bus worker thread.
pub const WORKER_THREAD_NAME: &str = "evo-actuator-bus";

/// Running count of observed command outcomes.
///
/// Abandoned commands are counted separately from preempted ones: they
/// point at a worker shutdown or transport failure, not at a newer command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    /// Commands the worker completed.
    pub completed: u64,
    /// Commands replaced before the worker took them.
    pub preempted: u64,
    /// Commands whose completion was abandoned.
    pub abandoned: u64,
}

impl OutcomeTally {
    /// Record one observed outcome.
    pub fn record(&mut self, outcome: Result<Completion, Abandoned>) {
        match outcome {
            Ok(Completion::Completed) => self.completed += 1,
            Ok(Completion::Preempted) => self.preempted += 1,
            Err(Abandoned) => self.abandoned += 1,
        }
    }

    /// Number of outcomes recorded.
    pub fn total(&self) -> u64 {
        self.completed + self.preempted + self.abandoned
    }
}

/// Actuator driver.
pub struct ActuatorDriver {
    calibration: SharedCalibration,
    guard: Option<CompletionGuard<ActuatorCommand>>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<WorkerStats>>,
    target_count: usize,
}

impl ActuatorDriver {
    /// Validate `config`, load its calibration and start the bus worker.
    pub fn start(config: &DriverConfig, actuator: Box<dyn Actuate>) -> DriverResult<Self> {
        config.validate()?;

        let mut calibration = Calibration::new();
        for entry in &config.calibration {
            calibration.set(entry.targets.clone(), entry.params());
        }
        info!(
            service = %config.shared.service_name,
            targets = config.target_count,
            groups = calibration.len(),
            "calibration loaded"
        );
        let calibration = Arc::new(RwLock::new(calibration));

        let (slot, backing) = channel();
        let running = Arc::new(AtomicBool::new(true));
        let worker = Worker::new(
            backing,
            Arc::clone(&calibration),
            actuator,
            Arc::clone(&running),
            config.poll_interval(),
            config.apply_time(),
        );
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || worker.run())?;

        Ok(Self {
            calibration,
            guard: Some(CompletionGuard::new(slot)),
            running,
            worker: Some(handle),
            target_count: config.target_count,
        })
    }

    /// Number of targets on the bus.
    pub fn target_count(&self) -> usize {
        self.target_count
    }

    /// Get a clone of the running flag (for signal handlers).
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// `true` while the worker accepts commands.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && self.guard.as_ref().is_some_and(CompletionGuard::is_connected)
    }

    /// Assign calibration `params` to `targets`.
    pub fn calibrate(&self, targets: DynTargetSet, params: ActuatorParams) -> DriverResult<()> {
        self.check_targets(&targets)?;
        debug!(targets = targets.count(), ?params, "calibration update");
        self.calibration.write().set(targets, params);
        Ok(())
    }

    /// Snapshot of the current calibration groups.
    pub fn calibration(&self) -> Vec<ParameterGroup<DynTargetSet, ActuatorParams>> {
        self.calibration.read().get().to_vec()
    }

    /// Hand `command` to the bus worker without waiting.
    ///
    /// Preempts the previous command if the worker has not taken it yet.
    /// The returned deferred reports the outcome.
    pub fn submit(&mut self, command: ActuatorCommand) -> DriverResult<Deferred<Completion>> {
        self.check_targets(&command.targets)?;
        let guard = self.guard.take().ok_or(DriverError::Stopped)?;

        // The guard goes back into the driver right away; the caller keeps
        // the completion and decides when to observe it.
        let (guard, completion) = guard.enqueue_relaxed(command).unsafe_get();
        self.guard = Some(guard);
        Ok(completion)
    }

    /// Hand `command` to the bus worker and block until it completes or is
    /// preempted.
    ///
    /// Abandonment is reported as `Preempted`.
    pub fn submit_and_wait(&mut self, command: ActuatorCommand) -> DriverResult<Completion> {
        self.check_targets(&command.targets)?;
        let guard = self.guard.take().ok_or(DriverError::Stopped)?;

        let (guard, outcome) = guard.enqueue(command).get();
        self.guard = Some(guard);
        Ok(Completion::resolve(outcome))
    }

    /// Stop the worker and return its counters.
    ///
    /// A command still waiting in the slot is abandoned.
    pub fn shutdown(mut self) -> DriverResult<WorkerStats> {
        self.stop()
    }

    fn stop(&mut self) -> DriverResult<WorkerStats> {
        self.running.store(false, Ordering::SeqCst);
        self.guard = None;

        let handle = self.worker.take().ok_or(DriverError::Stopped)?;
        let stats = handle.join().map_err(|_| DriverError::WorkerPanicked)?;
        info!(
            taken = stats.taken,
            applied = stats.applied,
            failed = stats.failed,
            "actuator driver stopped"
        );
        Ok(stats)
    }

    fn check_targets(&self, targets: &DynTargetSet) -> DriverResult<()> {
        match targets.members().find(|&t| t >= self.target_count) {
            Some(target) => Err(DriverError::TargetOutOfRange {
                target,
                target_count: self.target_count,
            }),
            None => Ok(()),
        }
    }
}

impl Drop for ActuatorDriver {
    fn drop(&mut self) {
        if self.worker.is_some() {
            if let Err(e) = self.stop() {
                warn!("actuator driver stop on drop failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_separates_abandoned() {
        let mut tally = OutcomeTally::default();
        tally.record(Ok(Completion::Completed));
        tally.record(Ok(Completion::Preempted));
        tally.record(Ok(Completion::Preempted));
        tally.record(Err(Abandoned));

        assert_eq!(
            tally,
            OutcomeTally {
                completed: 1,
                preempted: 2,
                abandoned: 1
            }
        );
        assert_eq!(tally.total(), 4);
    }
}
