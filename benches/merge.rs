//! Benchmarks for bar store merge and returns derivation

use alpaca_daily::store::{compute_returns, merge, Bar};
use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;

fn daily_bars(days: usize) -> Vec<Bar> {
    (0..days)
        .map(|i| {
            let close = Decimal::from(100) + Decimal::from((i % 50) as u32) / Decimal::from(10);
            Bar {
                ts: Utc.with_ymd_and_hms(2014, 1, 1, 5, 0, 0).unwrap() + Duration::days(i as i64),
                open: close,
                high: close + Decimal::ONE,
                low: close - Decimal::ONE,
                close,
                volume: Decimal::from(1_000_000),
            }
        })
        .collect()
}

fn benchmark_merge_incremental(c: &mut Criterion) {
    // Ten years of history plus a few fresh days, the steady-state shape
    let existing = daily_bars(2520);
    let incoming = daily_bars(2525)[2520..].to_vec();

    c.bench_function("merge_incremental", |b| {
        b.iter(|| merge(black_box(&existing), black_box(&incoming)))
    });
}

fn benchmark_merge_full_overlap(c: &mut Criterion) {
    let existing = daily_bars(2520);

    c.bench_function("merge_full_overlap", |b| {
        b.iter(|| merge(black_box(&existing), black_box(&existing)))
    });
}

fn benchmark_compute_returns(c: &mut Criterion) {
    let bars = daily_bars(2520);

    c.bench_function("compute_returns", |b| {
        b.iter(|| compute_returns(black_box(&bars)))
    });
}

criterion_group!(
    benches,
    benchmark_merge_incremental,
    benchmark_merge_full_overlap,
    benchmark_compute_returns
);
criterion_main!(benches);
