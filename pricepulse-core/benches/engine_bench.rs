//! Criterion benchmarks for PricePulse hot paths.
//!
//! Benchmarks:
//! 1. Indicator columns (SMA, EMA, RSI, MACD, Bollinger, ATR-proxy)
//! 2. Full engine compute over a series
//! 3. Scoring a computed frame
//! 4. Resampling 1h bars to 4h
//! 5. One dashboard cell end to end

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pricepulse_core::config::{AnalysisSettings, IntervalSpec};
use pricepulse_core::indicators::{AtrProxy, Bollinger, Ema, Indicator, Macd, Rsi, Sma};
use pricepulse_core::pipeline::Analyzer;
use pricepulse_core::resample::resample_to;
use pricepulse_core::{BarInterval, IndicatorEngine, PriceSeries, SignalScorer};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.01)
        .collect()
}

fn make_series(n: usize) -> PriceSeries {
    let base = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
    PriceSeries::from_pairs(
        make_closes(n)
            .into_iter()
            .enumerate()
            .map(|(i, c)| (base + Duration::hours(i as i64), c)),
    )
    .unwrap()
}

// ── 1. Indicators ────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator_columns");

    for bar_count in [500, 2_000, 10_000] {
        let closes = make_closes(bar_count);
        let indicators: Vec<Box<dyn Indicator>> = vec![
            Box::new(Sma::new(20)),
            Box::new(Ema::new(20)),
            Box::new(Rsi::new(14)),
            Box::new(Macd::signal(12, 26, 9)),
            Box::new(Bollinger::upper(20, 2.0)),
            Box::new(AtrProxy::new(14)),
        ];
        for indicator in &indicators {
            group.bench_with_input(
                BenchmarkId::new(indicator.name().to_string(), bar_count),
                &closes,
                |b, closes| b.iter(|| indicator.compute(black_box(closes))),
            );
        }
    }

    group.finish();
}

// ── 2. Engine ────────────────────────────────────────────────────────

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_compute");
    let engine = IndicatorEngine::default();

    for bar_count in [500, 2_000, 10_000] {
        let series = make_series(bar_count);
        group.bench_with_input(
            BenchmarkId::new("full_palette", bar_count),
            &series,
            |b, series| b.iter(|| engine.compute(black_box(series))),
        );
    }

    group.finish();
}

// ── 3. Scorer ────────────────────────────────────────────────────────

fn bench_scorer(c: &mut Criterion) {
    let frame = IndicatorEngine::default().compute(&make_series(2_000));
    let scorer = SignalScorer::default();
    c.bench_function("score_2000_rows", |b| b.iter(|| scorer.score(black_box(&frame))));
}

// ── 4. Resampler ─────────────────────────────────────────────────────

fn bench_resample(c: &mut Criterion) {
    let series = make_series(2_160);
    c.bench_function("resample_90d_1h_to_4h", |b| {
        b.iter(|| resample_to(black_box(&series), BarInterval::FourHours))
    });
}

// ── 5. Pipeline cell ─────────────────────────────────────────────────

fn bench_cell(c: &mut Criterion) {
    let series = make_series(2_160);
    let spec = IntervalSpec::new("4h", "4 Hours", BarInterval::OneHour, "90d")
        .resampled_to(BarInterval::FourHours);
    let analyzer = Analyzer::new(AnalysisSettings::default()).unwrap();
    c.bench_function("analyze_cell_4h", |b| {
        b.iter(|| analyzer.analyze(black_box(&series), &spec))
    });
}

criterion_group!(
    benches,
    bench_indicators,
    bench_engine,
    bench_scorer,
    bench_resample,
    bench_cell
);
criterion_main!(benches);
