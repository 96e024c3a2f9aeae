// Benchmarks for the fixed-size object pool allocator
//
// Tests:
// - Single allocate/deallocate throughput
// - Filling a pool and spilling into the next one
// - The block-growth slow path

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nodepool::mem_pool::PoolHandle;

struct Node {
    value: u64,
    next: u64,
}

/// Benchmark single allocate/deallocate operations
fn bench_alloc_dealloc_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_single_ops");
    group.throughput(Throughput::Elements(1));

    group.bench_function("allocate", |b| {
        let handle: PoolHandle<Node> = PoolHandle::new();
        b.iter(|| {
            let ptr = handle.allocate();
            black_box(ptr);
            unsafe { handle.deallocate(ptr) };
        });
    });

    group.bench_function("allocate_then_write", |b| {
        let handle: PoolHandle<Node> = PoolHandle::new();
        b.iter(|| {
            let ptr = handle.allocate();
            unsafe {
                ptr.as_ptr().write(Node {
                    value: black_box(42),
                    next: 0,
                });
                handle.deallocate(ptr);
            }
        });
    });

    group.bench_function("alloc_dealloc_roundtrip", |b| {
        let handle: PoolHandle<u64> = PoolHandle::new();
        b.iter(|| {
            let ptr = handle.allocate();
            black_box(ptr);
            unsafe { handle.deallocate(ptr) };
        });
    });

    group.finish();
}

/// Benchmark throughput when allocating (and then freeing) a batch
fn bench_batch_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_batch_throughput");

    for batch_size in [16usize, 256, 4096].iter() {
        group.throughput(Throughput::Elements(*batch_size as u64));

        group.bench_with_input(
            BenchmarkId::new("alloc_batch", batch_size),
            batch_size,
            |b, &size| {
                let handle: PoolHandle<u64> = PoolHandle::new();
                b.iter(|| {
                    let mut ptrs = Vec::with_capacity(size);
                    for _ in 0..size {
                        ptrs.push(handle.allocate());
                    }
                    for ptr in ptrs {
                        unsafe { handle.deallocate(ptr) };
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the pool-to-pool spill within a single block (crossing the
/// `b*b` slot boundary of the first pool)
fn bench_pool_spill(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_spill");
    group.throughput(Throughput::Elements(1));

    group.bench_function("allocate_past_first_pool_boundary", |b| {
        b.iter_batched(
            || {
                let handle: PoolHandle<u64> = PoolHandle::new();
                // Fill exactly one pool's worth of slots (64 * 64) so the
                // next allocation must spill into the second pool.
                let mut ptrs = Vec::with_capacity(64 * 64);
                for _ in 0..(64 * 64) {
                    ptrs.push(handle.allocate());
                }
                (handle, ptrs)
            },
            |(handle, mut ptrs)| {
                let spill = handle.allocate();
                black_box(spill);
                ptrs.push(spill);
                for ptr in ptrs {
                    unsafe { handle.deallocate(ptr) };
                }
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Benchmark the block-growth slow path (forcing a new block once the first
/// is completely full)
fn bench_block_growth(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_block_growth");
    group.throughput(Throughput::Elements(1));

    group.bench_function("allocate_past_block_boundary", |b| {
        b.iter_batched(
            || {
                let handle: PoolHandle<u8> = PoolHandle::new();
                let mut ptrs = Vec::with_capacity(64 * 64 * 64);
                for _ in 0..(64 * 64 * 64) {
                    ptrs.push(handle.allocate());
                }
                (handle, ptrs)
            },
            |(handle, mut ptrs)| {
                let overflow = handle.allocate();
                black_box(overflow);
                ptrs.push(overflow);
                for ptr in ptrs {
                    unsafe { handle.deallocate(ptr) };
                }
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_alloc_dealloc_single,
    bench_batch_throughput,
    bench_pool_spill,
    bench_block_growth,
);

criterion_main!(benches);
