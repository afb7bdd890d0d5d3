//! Benchmarks for session breakout gap detection.

use breakout_fvg::prelude::*;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Generate deterministic minute bars starting at midnight.
///
/// The first 540 bars (the Asian session) oscillate in a tight band; later bars drift
/// upward so the breakout comes early and the gap, if any, comes late.
fn generate_bars(n: usize) -> Vec<Bar> {
  let start: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
  let mut bars = Vec::with_capacity(n);
  let mut price = 100.0;

  for i in 0..n {
    let change = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0; // Deterministic "random"
    let drift = if i < 540 { -change * 0.5 } else { 0.01 };
    let volatility = 2.0 + ((i * 3) % 10) as f64 / 5.0;

    let o = price;
    let c = price + change * 0.1 + drift;
    let h = o.max(c) + volatility * 0.5;
    let l = o.min(c) - volatility * 0.5;

    bars.push(Bar::new(start + Duration::minutes(i as i64), o, h, l, c));
    price = c;
  }

  bars
}

fn bench_detect(c: &mut Criterion) {
  let bars = generate_bars(1440);
  let detector = SessionGapDetector::default();

  c.bench_function("detect_1440_minute_bars", |b| {
    b.iter(|| {
      let _ = black_box(detector.scan(black_box(&bars)));
    })
  });
}

fn bench_validated(c: &mut Criterion) {
  let bars = generate_bars(1440);
  let detector = SessionGapDetector::default().validate_data(true);

  c.bench_function("detect_validated_1440_minute_bars", |b| {
    b.iter(|| {
      let _ = black_box(detector.scan(black_box(&bars)));
    })
  });
}

fn bench_scaling(c: &mut Criterion) {
  let detector = SessionGapDetector::default();

  let mut group = c.benchmark_group("scaling");

  for size in [600, 1440, 2880, 10080].iter() {
    let bars = generate_bars(*size);

    group.bench_with_input(BenchmarkId::new("scan", size), size, |b, _| {
      b.iter(|| {
        let _ = black_box(detector.scan(black_box(&bars)));
      })
    });
  }

  group.finish();
}

fn bench_parallel_scan(c: &mut Criterion) {
  let bars1 = generate_bars(1440);
  let bars2 = generate_bars(1440);
  let bars3 = generate_bars(1440);
  let bars4 = generate_bars(1440);

  let detector = SessionGapDetector::default();

  let instruments: Vec<(&str, &[Bar])> =
    vec![("SYM1", &bars1), ("SYM2", &bars2), ("SYM3", &bars3), ("SYM4", &bars4)];

  c.bench_function("parallel_scan_4_instruments", |b| {
    b.iter(|| {
      let _ = black_box(scan_parallel(black_box(&detector), black_box(instruments.clone())));
    })
  });
}

criterion_group!(benches, bench_detect, bench_validated, bench_scaling, bench_parallel_scan,);

criterion_main!(benches);
