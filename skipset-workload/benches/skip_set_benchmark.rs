//! Lock-free versus locked skip set under the worker pool.
//!
//! Run with: cargo bench --package skipset-workload --bench skip_set_benchmark

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use mimalloc::MiMalloc;
use std::sync::Arc;

use skipset_core::{LockFree, LockFreeSkipSet, Locked, LockedSkipSet, SkipSet, SyncMode};
use skipset_workload::{
    GeneratorKind, OperationMix, UniformGenerator, WorkerPool, WorkloadConfig, partition,
    population_stats,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const THREAD_COUNTS: [usize; 6] = [1, 2, 4, 8, 16, 32];

fn run_workload<M: SyncMode + 'static>(config: &WorkloadConfig, prefill: usize) {
    let set = Arc::new(SkipSet::<i64, M>::new());
    population_stats(&mut UniformGenerator::new(config.range, 99), prefill, &*set);

    let budgets = partition(config).expect("benchmark partition");
    WorkerPool::from_config(config)
        .run(set, &budgets, None)
        .expect("benchmark workload");
}

fn workload(threads: usize, mix: OperationMix, range: i64) -> WorkloadConfig {
    WorkloadConfig {
        threads,
        operations: 100_000,
        mix,
        generator: GeneratorKind::Uniform,
        seed: 1,
        range,
    }
}

// ============================================================================
// Read-mostly mix over a large range
// ============================================================================

fn read_mostly_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_mostly_skip_set");
    group.sample_size(20);

    for threads in THREAD_COUNTS {
        let config = workload(threads, OperationMix::read_mostly(), 1_000_000);

        group.bench_with_input(
            BenchmarkId::new("read_mostly_lock_free", threads),
            &config,
            |b, config| b.iter(|| run_workload::<LockFree>(black_box(config), 10_000)),
        );
        group.bench_with_input(
            BenchmarkId::new("read_mostly_locked", threads),
            &config,
            |b, config| b.iter(|| run_workload::<Locked>(black_box(config), 10_000)),
        );
    }

    group.finish();
}

// ============================================================================
// Update-heavy mix over a tiny range (high contention)
// ============================================================================

fn contention_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention_skip_set");
    group.sample_size(20);

    for threads in THREAD_COUNTS {
        let config = workload(threads, OperationMix::balanced(), 200);

        group.bench_with_input(
            BenchmarkId::new("contention_lock_free", threads),
            &config,
            |b, config| b.iter(|| run_workload::<LockFree>(black_box(config), 100)),
        );
        group.bench_with_input(
            BenchmarkId::new("contention_locked", threads),
            &config,
            |b, config| b.iter(|| run_workload::<Locked>(black_box(config), 100)),
        );
    }

    group.finish();
}

// ============================================================================
// Sequential insert
// ============================================================================

fn sequential_insert_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_insert_skip_set");

    for size in [1_000, 10_000, 100_000] {
        group.bench_with_input(
            BenchmarkId::new("sequential_insert_lock_free", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    let set = LockFreeSkipSet::new();
                    for i in 0..size {
                        set.add(black_box(i));
                    }
                    set
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("sequential_insert_locked", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    let set = LockedSkipSet::new();
                    for i in 0..size {
                        set.add(black_box(i));
                    }
                    set
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    read_mostly_benchmark,
    contention_benchmark,
    sequential_insert_benchmark,
);
criterion_main!(benches);
