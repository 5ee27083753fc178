//! Benchmarks: emission fan-out overhead.
//!
//! Run with: `cargo bench --bench emit_fanout`

#![allow(missing_docs)] // Benchmarks don't need extensive docs

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use statecast_core::Channel;

/// Cost of one emission as the listener count grows.
fn bench_emit_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit_fanout");

    for listeners in [1usize, 8, 64] {
        group.bench_function(format!("{listeners}_listeners"), |b| {
            let channel: Channel<u64> = Channel::replay_seeded(0);
            let _subs: Vec<_> = (0..listeners)
                .map(|_| {
                    channel.subscribe(|value| {
                        black_box(*value);
                    })
                })
                .collect();

            let mut tick = 0u64;
            b.iter(|| {
                tick += 1;
                channel.emit(black_box(tick));
            });
        });
    }

    group.finish();
}

/// Baseline: emission with no listeners registered.
fn bench_emit_no_listeners(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit_baseline");

    group.bench_function("no_listeners", |b| {
        let channel: Channel<u64> = Channel::plain();
        let mut tick = 0u64;
        b.iter(|| {
            tick += 1;
            channel.emit(black_box(tick));
        });
    });

    group.finish();
}

/// Subscribe/unsubscribe churn, including replay delivery.
fn bench_subscribe_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("subscribe_churn");

    group.bench_function("subscribe_then_drop", |b| {
        let channel: Channel<u64> = Channel::replay_seeded(0);
        b.iter(|| {
            let sub = channel.subscribe(|value| {
                black_box(*value);
            });
            drop(sub);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_emit_fanout,
    bench_emit_no_listeners,
    bench_subscribe_churn,
);
criterion_main!(benches);
