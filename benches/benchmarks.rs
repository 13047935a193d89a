//! Benchmarks for lazyflow
//!
//! Run with: cargo bench --features full

// Require all features for benchmarks
#[cfg(not(all(feature = "sequence", feature = "statistics")))]
compile_error!("Benchmarks require all features. Run: cargo bench --features full");

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use lazyflow::sequence::LazySequence;
use lazyflow::statistics::StreamingStats;

// ============================================================================
// Lazy sequence benchmarks
// ============================================================================

fn bench_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("lazy_sequence");

    group.bench_function("materialize_10k", |b| {
        b.iter(|| {
            let fib = LazySequence::with_rule(|i, cache: &[u64]| match i {
                0 => 0,
                1 => 1,
                _ => cache[i - 1].wrapping_add(cache[i - 2]),
            });
            black_box(fib.get(9_999).unwrap())
        });
    });

    group.bench_function("get_materialized", |b| {
        let seq: LazySequence<u64> = (0..10_000).collect();
        b.iter(|| black_box(seq.get(5_000).unwrap()));
    });

    group.bench_function("cursor_scan_10k", |b| {
        let seq: LazySequence<u64> = (0..10_000).collect();
        b.iter(|| {
            let sum: u64 = seq.cursor().sum();
            black_box(sum)
        });
    });

    group.bench_function("push", |b| {
        let seq = LazySequence::new();
        let mut i = 0u64;
        b.iter(|| {
            seq.push(i);
            i = i.wrapping_add(1);
        });
    });

    group.finish();
}

// ============================================================================
// Streaming statistics benchmarks
// ============================================================================

fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming_stats");
    group.throughput(Throughput::Elements(1));

    group.bench_function("add", |b| {
        let mut stats = StreamingStats::new();
        let mut i = 0u64;
        b.iter(|| {
            // Alternate around a center so both heaps stay busy
            let v = if i % 2 == 0 { i as f64 } else { -(i as f64) };
            stats.add(v);
            i = i.wrapping_add(1);
        });
    });

    group.bench_function("median", |b| {
        let mut stats = StreamingStats::new();
        for i in 0..100_000u64 {
            stats.add(i as f64);
        }
        b.iter(|| black_box(stats.median()));
    });

    group.bench_function("merge_10k", |b| {
        let mut s1 = StreamingStats::new();
        let mut s2 = StreamingStats::new();
        for i in 0..10_000u64 {
            s1.add(i as f64);
            s2.add((i + 10_000) as f64);
        }
        b.iter(|| {
            let mut s = s1.clone();
            s.merge(black_box(&s2));
            black_box(s.median())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_sequence, bench_stats);
criterion_main!(benches);
