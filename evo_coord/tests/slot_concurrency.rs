//! Cross-thread tests for the command slot: one producer, one consumer,
//! every command resolved exactly once.

use evo_coord::guard::CompletionGuard;
use evo_coord::oneshot::DeferredStatus;
use evo_coord::slot::{Completion, channel};
use std::thread;
use std::time::Duration;

const COMMANDS: u32 = 200;

/// Every enqueued command receives exactly one terminal signal, and the
/// last one is always completed.
#[test]
fn every_command_resolves_once() {
    let (slot, backing) = channel::<u32>();

    let consumer = thread::spawn(move || {
        let mut applied = Vec::new();
        while backing.has_producer() || backing.is_pending() {
            if let Some(cmd) = backing.take_timeout(Duration::from_millis(1)) {
                applied.push(cmd.complete());
            }
        }
        applied
    });

    let completions: Vec<_> = (0..COMMANDS).map(|i| slot.enqueue(i)).collect();
    drop(slot);
    let applied = consumer.join().expect("consumer panicked");

    let outcomes: Vec<Completion> = completions
        .iter()
        .map(|c| c.wait().expect("no command is abandoned"))
        .collect();

    let completed: Vec<u32> = outcomes
        .iter()
        .enumerate()
        .filter(|(_, outcome)| **outcome == Completion::Completed)
        .map(|(i, _)| i as u32)
        .collect();

    assert_eq!(completed, applied, "completed commands match consumer order");
    assert_eq!(outcomes.last(), Some(&Completion::Completed));
    assert!(applied.windows(2).all(|w| w[0] < w[1]));
}

/// A preempted future resolves before the preempting enqueue returns.
#[test]
fn preemption_is_visible_when_enqueue_returns() {
    let (slot, _backing) = channel::<u32>();
    for i in 0..COMMANDS {
        let older = slot.enqueue(i);
        let _newer = slot.enqueue(i + 1);
        assert_eq!(older.status(), DeferredStatus::Ready);
    }
}

/// The producer ticket can move to another thread.
#[test]
fn guard_moves_across_threads() {
    let (slot, backing) = channel::<String>();
    let producer = thread::spawn(move || {
        let (guard, outcome) = CompletionGuard::new(slot).enqueue("move-to-home").get();
        (guard.is_connected(), outcome)
    });

    let cmd = loop {
        if let Some(cmd) = backing.take_timeout(Duration::from_millis(10)) {
            break cmd;
        }
    };
    assert_eq!(cmd.command(), "move-to-home");
    cmd.complete();

    let (connected, outcome) = producer.join().expect("producer panicked");
    assert!(connected);
    assert_eq!(outcome, Ok(Completion::Completed));
}

/// Tearing down the consumer unblocks a strict waiter.
#[test]
fn backing_teardown_unblocks_waiter() {
    let (slot, backing) = channel::<u8>();
    let waiter = thread::spawn(move || CompletionGuard::new(slot).enqueue(3u8).get().1);

    while !backing.is_pending() {
        thread::sleep(Duration::from_millis(1));
    }
    drop(backing);

    let outcome = waiter.join().expect("waiter panicked");
    assert!(outcome.is_err());
    assert_eq!(Completion::resolve(outcome), Completion::Preempted);
}
