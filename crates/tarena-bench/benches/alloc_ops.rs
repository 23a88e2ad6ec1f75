//! Criterion micro-benchmarks for arena allocate, free, reallocate and reset.

use std::hint::black_box;
use std::ptr::NonNull;

use criterion::{criterion_group, criterion_main, Criterion};
use tarena::{Arena, ArenaConfig};
use tarena_bench::{bench_config, Workload};

/// Benchmark: allocate then immediately free one 64-byte block.
fn bench_alloc_free_64(c: &mut Criterion) {
    let mut arena = Arena::new(ArenaConfig::default()).unwrap();
    c.bench_function("alloc_free_64", |b| {
        b.iter(|| {
            let p = arena.allocate(black_box(64)).unwrap();
            // SAFETY: `p` came from `arena` and is freed once.
            unsafe { arena.free(Some(p)) };
        });
    });
}

/// Benchmark: bump-allocate a 10K request mix, then reset.
fn bench_bump_then_reset_10k(c: &mut Criterion) {
    tarena_test_utils::init_tracing();
    let workload = Workload::new(10_000, 4096, 42);
    let mut arena = Arena::new(bench_config(&workload)).unwrap();
    c.bench_function("bump_then_reset_10k", |b| {
        b.iter(|| {
            for &size in &workload.sizes {
                black_box(arena.allocate(size));
            }
            arena.reset();
        });
    });
}

/// Benchmark: allocate a mix, free every other block, reallocate the mix.
///
/// Exercises first-fit search and coalescing on a fragmented free list.
fn bench_fragmented_churn_1k(c: &mut Criterion) {
    let workload = Workload::new(1_000, 2048, 7);
    let mut arena = Arena::new(bench_config(&workload)).unwrap();
    c.bench_function("fragmented_churn_1k", |b| {
        b.iter(|| {
            let blocks: Vec<NonNull<u8>> = workload
                .sizes
                .iter()
                .filter_map(|&size| arena.allocate(size))
                .collect();
            for p in blocks.iter().step_by(2) {
                // SAFETY: each block is live and freed once.
                unsafe { arena.free(Some(*p)) };
            }
            for &size in workload.sizes.iter().step_by(2) {
                black_box(arena.allocate(size));
            }
            arena.reset();
        });
    });
}

/// Benchmark: grow one block by doubling from 16 bytes to 64 KiB.
fn bench_realloc_doubling(c: &mut Criterion) {
    let mut arena = Arena::new(ArenaConfig::default()).unwrap();
    c.bench_function("realloc_doubling_64k", |b| {
        b.iter(|| {
            let mut p = arena.allocate(16);
            let mut size = 16;
            while size < 64 * 1024 {
                size *= 2;
                // SAFETY: `p` is the live block from the previous step.
                p = unsafe { arena.reallocate(p, size) };
            }
            black_box(p);
            arena.reset();
        });
    });
}

/// Benchmark: thread-local API against an explicit arena and the system heap.
fn bench_front_ends(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc_free_256");
    group.bench_function("thread_local", |b| {
        b.iter(|| {
            let p = tarena::allocate(black_box(256));
            // SAFETY: allocated on this thread just above.
            unsafe { tarena::free(p) };
        });
    });
    let mut arena = Arena::new(ArenaConfig::default()).unwrap();
    group.bench_function("explicit_arena", |b| {
        b.iter(|| {
            let p = arena.allocate(black_box(256));
            // SAFETY: `p` came from `arena`.
            unsafe { arena.free(p) };
        });
    });
    group.bench_function("system_heap", |b| {
        b.iter(|| black_box(Vec::<u8>::with_capacity(black_box(256))));
    });
    group.finish();
}

/// Benchmark: zero-allocate a 4 KiB array, then reset.
fn bench_zero_allocate_4k(c: &mut Criterion) {
    let mut arena = Arena::new(ArenaConfig::default()).unwrap();
    c.bench_function("zero_allocate_4k", |b| {
        b.iter(|| {
            black_box(arena.zero_allocate(512, 8));
            arena.reset();
        });
    });
}

criterion_group!(
    benches,
    bench_alloc_free_64,
    bench_bump_then_reset_10k,
    bench_fragmented_churn_1k,
    bench_realloc_doubling,
    bench_front_ends,
    bench_zero_allocate_4k
);
criterion_main!(benches);
