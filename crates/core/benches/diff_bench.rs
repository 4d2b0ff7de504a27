//! Performance benchmarks for the content hasher and line differ
//!
//! Run with: cargo bench --package minivcs-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use minivcs_core::{hash_bytes, DiffEngine};

fn bench_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_sizes");

    for size in [64, 4 * 1024, 256 * 1024] {
        let data = vec![0xabu8; size];

        group.bench_with_input(BenchmarkId::new("hash_bytes", size), &data, |b, data| {
            b.iter(|| {
                let hash = hash_bytes(data);
                black_box(hash);
            });
        });
    }

    group.finish();
}

/// Build two related line sequences: every third line differs
fn diff_inputs(lines: usize) -> (Vec<String>, Vec<String>) {
    let old: Vec<String> = (0..lines).map(|i| format!("line {i}")).collect();
    let new: Vec<String> = (0..lines)
        .map(|i| {
            if i % 3 == 0 {
                format!("changed line {i}")
            } else {
                format!("line {i}")
            }
        })
        .collect();
    (old, new)
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_sizes");
    let engine = DiffEngine::new();

    // the differ is quadratic, so sizes step by 10x to show the curve
    for size in [10, 100, 1000] {
        let (old, new) = diff_inputs(size);

        group.bench_with_input(
            BenchmarkId::new("diff_lines", size),
            &(old.clone(), new.clone()),
            |b, (old, new)| {
                b.iter(|| {
                    let diff = engine.diff_lines(old, new).unwrap();
                    black_box(diff);
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("summary", size),
            &(old, new),
            |b, (old, new)| {
                b.iter(|| {
                    let summary = engine.summary(old, new);
                    black_box(summary);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_hashing, bench_diff);
criterion_main!(benches);
