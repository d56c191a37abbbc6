//! Bus worker: the consumer side of the command slot.
//!
//! The worker owns the [`SlotBacking`], so the slot's cell lives exactly as
//! long as the worker. Per command it:
//!
//! 1. takes the pending command (after which it can no longer be preempted),
//! 2. resolves each target's output through the shared calibration,
//! 3. hands the outputs to the [`Actuate`] transport,
//! 4. waits the configured apply time and marks the command `Completed`.
//!
//! A transport failure drops the command without completing it, which the
//! producer observes as abandonment.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use evo_coord::calibration::Calibration;
use evo_coord::slot::SlotBacking;
use evo_coord::target_set::{DynTargetSet, TargetSet};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::actuator::Actuate;
use crate::command::{ActuatorCommand, ActuatorParams};
use crate::error::DriverResult;

/// Calibration shared between the driver (writer) and the worker (reader).
pub type SharedCalibration = Arc<RwLock<Calibration<DynTargetSet, ActuatorParams>>>;

/// Counters reported when the worker stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Commands taken from the slot.
    pub taken: u64,
    /// Commands applied and completed.
    pub applied: u64,
    /// Commands dropped after a transport failure.
    pub failed: u64,
}

/// Consumer loop state, moved onto the worker thread.
pub struct Worker {
    backing: SlotBacking<ActuatorCommand>,
    calibration: SharedCalibration,
    actuator: Box<dyn Actuate>,
    running: Arc<AtomicBool>,
    poll_interval: Duration,
    apply_time: Duration,
    stats: WorkerStats,
}

impl Worker {
    /// Create a worker draining `backing`.
    pub fn new(
        backing: SlotBacking<ActuatorCommand>,
        calibration: SharedCalibration,
        actuator: Box<dyn Actuate>,
        running: Arc<AtomicBool>,
        poll_interval: Duration,
        apply_time: Duration,
    ) -> Self {
        Self {
            backing,
            calibration,
            actuator,
            running,
            poll_interval,
            apply_time,
            stats: WorkerStats::default(),
        }
    }

    /// Run until the running flag clears, or the producer is gone and the
    /// slot is drained.
    ///
    /// Dropping the worker at the end abandons any command left in the slot.
    pub fn run(mut self) -> WorkerStats {
        info!(actuator = self.actuator.name(), "bus worker started");

        while self.running.load(Ordering::SeqCst)
            && (self.backing.has_producer() || self.backing.is_pending())
        {
            let Some(pending) = self.backing.take_timeout(self.poll_interval) else {
                continue;
            };
            self.stats.taken += 1;

            match self.apply(pending.command()) {
                Ok(()) => {
                    if !self.apply_time.is_zero() {
                        thread::sleep(self.apply_time);
                    }
                    pending.complete();
                    self.stats.applied += 1;
                }
                Err(e) => {
                    warn!("command dropped: {e}");
                    self.stats.failed += 1;
                }
            }
        }

        info!(
            taken = self.stats.taken,
            applied = self.stats.applied,
            failed = self.stats.failed,
            "bus worker stopped"
        );
        self.stats
    }

    fn apply(&mut self, command: &ActuatorCommand) -> DriverResult<()> {
        let calibration = self.calibration.read();
        for target in command.targets.members() {
            let params = calibration.lookup(target).copied().unwrap_or_default();
            let output = params.output(command.setpoint);
            debug!(target, setpoint = command.setpoint, output, "driving target");
            self.actuator.apply(target, output)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverError;
    use evo_coord::oneshot::Abandoned;
    use evo_coord::slot::{Completion, channel};
    use parking_lot::Mutex;

    #[derive(Clone, Default)]
    struct Recorder {
        outputs: Arc<Mutex<Vec<(usize, f64)>>>,
        fail_on: Option<usize>,
    }

    impl Actuate for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn apply(&mut self, target: usize, output: f64) -> DriverResult<()> {
            if self.fail_on == Some(target) {
                return Err(DriverError::Actuation {
                    target,
                    reason: "bus timeout".to_string(),
                });
            }
            self.outputs.lock().push((target, output));
            Ok(())
        }
    }

    fn worker_for(recorder: Recorder) -> (evo_coord::slot::Slot<ActuatorCommand>, Worker) {
        let (slot, backing) = channel();
        let mut calibration = Calibration::new();
        calibration.set(
            DynTargetSet::from_bits(0b10),
            ActuatorParams {
                gain: 2.0,
                offset: 1.0,
            },
        );
        let worker = Worker::new(
            backing,
            Arc::new(RwLock::new(calibration)),
            Box::new(recorder),
            Arc::new(AtomicBool::new(true)),
            Duration::from_millis(1),
            Duration::ZERO,
        );
        (slot, worker)
    }

    #[test]
    fn applies_calibrated_outputs_and_completes() {
        let recorder = Recorder::default();
        let (slot, worker) = worker_for(recorder.clone());

        let completion = slot.enqueue(ActuatorCommand::new(DynTargetSet::from_bits(0b11), 3.0));
        drop(slot);
        let stats = worker.run();

        assert_eq!(completion.wait(), Ok(Completion::Completed));
        assert_eq!(*recorder.outputs.lock(), vec![(0, 3.0), (1, 7.0)]);
        assert_eq!(
            stats,
            WorkerStats {
                taken: 1,
                applied: 1,
                failed: 0
            }
        );
    }

    #[test]
    fn transport_failure_abandons_command() {
        let recorder = Recorder {
            fail_on: Some(1),
            ..Recorder::default()
        };
        let (slot, worker) = worker_for(recorder);

        let completion = slot.enqueue(ActuatorCommand::new(DynTargetSet::from_bits(0b10), 1.0));
        drop(slot);
        let stats = worker.run();

        assert_eq!(completion.wait(), Err(Abandoned));
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.applied, 0);
    }

    #[test]
    fn cleared_flag_stops_worker() {
        let (slot, worker) = worker_for(Recorder::default());
        worker.running.store(false, Ordering::SeqCst);
        let completion = slot.enqueue(ActuatorCommand::new(DynTargetSet::from_bits(0b1), 0.0));

        let stats = worker.run();
        assert_eq!(stats, WorkerStats::default());
        assert_eq!(completion.wait(), Err(Abandoned));
    }
}
