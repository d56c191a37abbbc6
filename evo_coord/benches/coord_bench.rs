//! Coordination core benchmarks.
//!
//! `Calibration::set` on fixed and dynamic masks, and one enqueue/take/complete
//! round through the command slot.

use criterion::{Criterion, criterion_group, criterion_main};
use evo_coord::calibration::Calibration;
use evo_coord::slot::channel;
use evo_coord::target_set::DynTargetSet;
use std::hint::black_box;

fn bench_calibration_set_u64(c: &mut Criterion) {
    c.bench_function("calibration_set_u64", |b| {
        b.iter(|| {
            let mut cal = Calibration::<u64, f64>::new();
            for i in 0..64u32 {
                cal.set(black_box(0xFFu64.rotate_left(i)), f64::from(i));
            }
            black_box(cal.len())
        });
    });
}

fn bench_calibration_set_dyn(c: &mut Criterion) {
    let masks: Vec<DynTargetSet> = (0..128)
        .map(|i| (i..i + 8).map(|t| t % 128).collect())
        .collect();

    c.bench_function("calibration_set_dyn_128", |b| {
        b.iter(|| {
            let mut cal = Calibration::<DynTargetSet, u32>::new();
            for (i, mask) in masks.iter().enumerate() {
                cal.set(mask.clone(), i as u32);
            }
            black_box(cal.len())
        });
    });
}

fn bench_slot_round_trip(c: &mut Criterion) {
    let (slot, backing) = channel::<u64>();

    c.bench_function("slot_enqueue_take_complete", |b| {
        b.iter(|| {
            let completion = slot.enqueue(black_box(42u64));
            if let Some(cmd) = backing.try_take() {
                cmd.complete();
            }
            black_box(completion.status())
        });
    });
}

fn bench_slot_preempt(c: &mut Criterion) {
    let (slot, _backing) = channel::<u64>();

    c.bench_function("slot_enqueue_preempt", |b| {
        b.iter(|| black_box(slot.enqueue(black_box(7u64))));
    });
}

criterion_group!(
    benches,
    bench_calibration_set_u64,
    bench_calibration_set_dyn,
    bench_slot_round_trip,
    bench_slot_preempt
);
criterion_main!(benches);
