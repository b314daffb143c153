//! Benchmarks for the core containers
//!
//! Compares the crate's containers against their std counterparts:
//! - DynVec vs Vec (push, random access)
//! - BitVec range fills vs per-bit loops
//! - DenseMap / SparseMap vs std::HashMap (insert, lookup)
//! - BlockPool alloc/free cycles vs the global allocator

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::collections::HashMap;

use groundwork::{BitVec, BlockPool, DenseMap, DynVec, SparseMap};

const SIZES: &[usize] = &[100, 1_000, 10_000];

fn bench_vector_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_push");

    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("std::Vec", size), &size, |b, &size| {
            b.iter(|| {
                let mut vec = Vec::new();
                for i in 0..size {
                    vec.push(black_box(i as u64));
                }
                black_box(vec)
            });
        });

        group.bench_with_input(BenchmarkId::new("DynVec", size), &size, |b, &size| {
            b.iter(|| {
                let mut vec = DynVec::new();
                for i in 0..size {
                    vec.push_back(black_box(i as u64)).unwrap();
                }
                black_box(vec)
            });
        });
    }

    group.finish();
}

fn bench_bitvec_range_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("bitvec_range_fill");

    for &size in &[1_000usize, 100_000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("set_range", size), &size, |b, &size| {
            b.iter(|| {
                let mut bits = BitVec::new();
                bits.set_range(black_box(3), black_box(size)).unwrap();
                black_box(bits)
            });
        });

        group.bench_with_input(BenchmarkId::new("per_bit", size), &size, |b, &size| {
            b.iter(|| {
                let mut bits = BitVec::new();
                for i in 3..3 + size {
                    bits.set(black_box(i)).unwrap();
                }
                black_box(bits)
            });
        });
    }

    group.finish();
}

fn bench_map_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_insert");

    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("std::HashMap", size), &size, |b, &size| {
            b.iter(|| {
                let mut map = HashMap::new();
                for i in 0..size as u64 {
                    map.insert(black_box(i), black_box(i * 2));
                }
                black_box(map)
            });
        });

        group.bench_with_input(BenchmarkId::new("DenseMap", size), &size, |b, &size| {
            b.iter(|| {
                let mut map = DenseMap::new();
                for i in 0..size as u64 {
                    map.insert(black_box(i), black_box(i * 2)).unwrap();
                }
                black_box(map)
            });
        });

        group.bench_with_input(BenchmarkId::new("SparseMap", size), &size, |b, &size| {
            b.iter(|| {
                let mut map = SparseMap::new();
                for i in 0..size as u64 {
                    map.insert(black_box(i), black_box(i * 2)).unwrap();
                }
                black_box(map)
            });
        });
    }

    group.finish();
}

fn bench_map_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_lookup");
    let size = 10_000u64;
    group.throughput(Throughput::Elements(size));

    let mut std_map = HashMap::new();
    let mut dense = DenseMap::new();
    let mut sparse = SparseMap::new();
    for i in 0..size {
        std_map.insert(i, i * 2);
        dense.insert(i, i * 2).unwrap();
        sparse.insert(i, i * 2).unwrap();
    }

    group.bench_function("std::HashMap", |b| {
        b.iter(|| {
            for i in 0..size {
                black_box(std_map.get(&black_box(i)));
            }
        });
    });

    group.bench_function("DenseMap", |b| {
        b.iter(|| {
            for i in 0..size {
                black_box(dense.get(&black_box(i)));
            }
        });
    });

    group.bench_function("SparseMap", |b| {
        b.iter(|| {
            for i in 0..size {
                black_box(sparse.get(&black_box(i)));
            }
        });
    });

    group.finish();
}

fn bench_block_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_pool");
    const ROUNDS: usize = 1_000;
    group.throughput(Throughput::Elements(ROUNDS as u64));

    group.bench_function("global_alloc", |b| {
        b.iter(|| {
            let mut blocks = Vec::with_capacity(ROUNDS);
            for _ in 0..ROUNDS {
                blocks.push(black_box(vec![0u8; 24]));
            }
            black_box(blocks)
        });
    });

    group.bench_function("BlockPool", |b| {
        let mut pool = BlockPool::new(24).unwrap();
        pool.reserve(ROUNDS).unwrap();
        b.iter(|| {
            let mut blocks = Vec::with_capacity(ROUNDS);
            for _ in 0..ROUNDS {
                blocks.push(pool.allocate().unwrap());
            }
            for block in blocks {
                pool.free(black_box(block));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_vector_push,
    bench_bitvec_range_fill,
    bench_map_insert,
    bench_map_lookup,
    bench_block_pool
);
criterion_main!(benches);
