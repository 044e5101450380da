//! Dashboard rendering: plain-text table or JSON document.

use chrono::{DateTime, Utc};
use pricepulse_core::pipeline::{CellOutcome, CellReport, SymbolReport};
use pricepulse_core::scoring::TradePlan;
use pricepulse_core::{BarInterval, IndicatorRow, SignalResult};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Serialize)]
pub struct DashboardView<'a> {
    pub generated_at: DateTime<Utc>,
    pub provider: &'a str,
    pub symbols: Vec<SymbolView<'a>>,
}

#[derive(Debug, Serialize)]
pub struct SymbolView<'a> {
    pub name: &'a str,
    pub ticker: &'a str,
    pub cells: Vec<CellView<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CellView<'a> {
    Ready {
        key: &'a str,
        label: &'a str,
        interval: BarInterval,
        bars: usize,
        last_close: Option<f64>,
        last_bar: Option<DateTime<Utc>>,
        signal: &'a SignalResult,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        chart: Vec<&'a IndicatorRow>,
    },
    Unavailable {
        key: &'a str,
        label: &'a str,
        reason: String,
    },
}

impl<'a> DashboardView<'a> {
    pub fn new(
        provider: &'a str,
        reports: &'a [SymbolReport],
        chart_rows: usize,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let symbols = reports
            .iter()
            .map(|report| SymbolView {
                name: &report.name,
                ticker: &report.ticker,
                cells: report
                    .cells
                    .iter()
                    .map(|cell| CellView::new(cell, chart_rows))
                    .collect(),
            })
            .collect();
        Self {
            generated_at,
            provider,
            symbols,
        }
    }
}

impl<'a> CellView<'a> {
    fn new(cell: &'a CellReport, chart_rows: usize) -> Self {
        match &cell.outcome {
            CellOutcome::Ready(analysis) => CellView::Ready {
                key: &cell.key,
                label: &cell.label,
                interval: analysis.interval,
                bars: analysis.bars,
                last_close: analysis.last_close(),
                last_bar: analysis.frame.last().map(|r| r.timestamp),
                signal: &analysis.signal,
                chart: analysis.chart(chart_rows),
            },
            CellOutcome::Unavailable(reason) => CellView::Unavailable {
                key: &cell.key,
                label: &cell.label,
                reason: reason.to_string(),
            },
        }
    }
}

pub fn to_json(view: &DashboardView<'_>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(view)
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn fmt_plan(plan: Option<&TradePlan>) -> (String, String) {
    match plan {
        Some(p) => (
            format!("{:.2} / {:.2}", p.long.stop, p.long.target),
            format!("{:.2} / {:.2}", p.short.stop, p.short.target),
        ),
        None => ("-".into(), "-".into()),
    }
}

/// Plain-text dashboard, one block per symbol.
pub fn to_table(view: &DashboardView<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== PricePulse Dashboard === {} ({})",
        view.generated_at.format("%Y-%m-%d %H:%M UTC"),
        view.provider
    );

    for symbol in &view.symbols {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} ({})", symbol.name, symbol.ticker);
        let _ = writeln!(
            out,
            "{:<12} {:>12} {:>8} {:<12} {:>23} {:>23}",
            "Interval", "Price", "Prob", "Signal", "Long stop / target", "Short stop / target"
        );
        let _ = writeln!(out, "{}", "-".repeat(95));

        for cell in &symbol.cells {
            match cell {
                CellView::Ready {
                    label,
                    last_close,
                    last_bar,
                    signal,
                    ..
                } => match signal {
                    SignalResult::Scored(score) => {
                        let (long, short) = fmt_plan(score.trade_plan.as_ref());
                        let _ = write!(
                            out,
                            "{:<12} {:>12} {:>7.2}% {:<12} {:>23} {:>23}",
                            label,
                            fmt_opt(*last_close),
                            score.probability,
                            score.recommendation.label(),
                            long,
                            short
                        );
                        // Undefined indicators at the tail push scoring back.
                        if *last_bar != Some(score.timestamp) {
                            let _ = write!(
                                out,
                                "  (scored at {})",
                                score.timestamp.format("%Y-%m-%d %H:%M")
                            );
                        }
                        let _ = writeln!(out);
                    }
                    SignalResult::InsufficientData => {
                        let _ = writeln!(
                            out,
                            "{:<12} {:>12} {:>8} insufficient data",
                            label,
                            fmt_opt(*last_close),
                            "-"
                        );
                    }
                },
                CellView::Unavailable { label, reason, .. } => {
                    let _ = writeln!(out, "{label:<12} unavailable: {reason}");
                }
            }
        }

        for cell in &symbol.cells {
            if let CellView::Ready { label, chart, .. } = cell {
                if chart.is_empty() {
                    continue;
                }
                let _ = writeln!(out);
                let _ = writeln!(out, "  {label} chart (last {} bars)", chart.len());
                let _ = writeln!(
                    out,
                    "  {:<17} {:>12} {:>12} {:>12}",
                    "Time", "Close", "SMA", "EMA"
                );
                for row in chart {
                    let _ = writeln!(
                        out,
                        "  {:<17} {:>12.2} {:>12} {:>12}",
                        row.timestamp.format("%Y-%m-%d %H:%M"),
                        row.close,
                        fmt_opt(row.sma),
                        fmt_opt(row.ema)
                    );
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pricepulse_core::data::SyntheticProvider;
    use pricepulse_core::pipeline::analyze;
    use pricepulse_core::{run_dashboard, AnalysisSettings, DashboardConfig, IntervalSpec, PriceSeries};

    fn reports() -> Vec<SymbolReport> {
        let anchor = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut config = DashboardConfig::default();
        config.intervals.truncate(2);
        run_dashboard(&SyntheticProvider::anchored_at(anchor), &config).unwrap()
    }

    #[test]
    fn table_lists_every_symbol_and_interval() {
        let reports = reports();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 5, 0).unwrap();
        let table = to_table(&DashboardView::new("synthetic", &reports, 0, now));
        assert!(table.starts_with("=== PricePulse Dashboard === 2024-06-01 00:05 UTC (synthetic)"));
        for ticker in ["BTC-USD", "ETH-USD", "SOL-USD"] {
            assert!(table.contains(ticker));
        }
        assert!(table.contains("15 Minutes"));
        assert!(table.contains("1 Hour"));
        assert!(!table.contains("chart (last"));
    }

    #[test]
    fn chart_rows_are_rendered_when_requested() {
        let reports = reports();
        let table = to_table(&DashboardView::new("synthetic", &reports, 5, Utc::now()));
        assert!(table.contains("chart (last 5 bars)"));
    }

    #[test]
    fn json_carries_status_and_signal() {
        let reports = reports();
        let view = DashboardView::new("synthetic", &reports, 3, Utc::now());
        let json: serde_json::Value = serde_json::from_str(&to_json(&view).unwrap()).unwrap();
        let cell = &json["symbols"][0]["cells"][0];
        assert_eq!(cell["status"], "ready");
        assert_eq!(cell["key"], "15m");
        assert!(cell["signal"]["status"].is_string());
        assert_eq!(cell["chart"].as_array().unwrap().len(), 3);
    }

    fn single_cell(closes: &[f64]) -> Vec<SymbolReport> {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let series = PriceSeries::from_pairs(
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| (base + Duration::hours(i as i64), c)),
        )
        .unwrap();
        let spec = IntervalSpec::new("1h", "1 Hour", BarInterval::OneHour, "30d");
        let analysis = analyze(&series, &spec, &AnalysisSettings::default()).unwrap();
        vec![SymbolReport {
            name: "Bitcoin".into(),
            ticker: "BTC-USD".into(),
            cells: vec![CellReport {
                key: "1h".into(),
                label: "1 Hour".into(),
                outcome: CellOutcome::Ready(analysis),
            }],
        }]
    }

    fn rising_closes() -> Vec<f64> {
        vec![
            100.0, 102.0, 101.0, 105.0, 107.0, 106.0, 110.0, 108.0, 112.0, 115.0, 114.0, 118.0,
            120.0, 119.0, 122.0, 125.0, 122.0, 121.0, 118.0, 117.0, 119.0, 123.0, 120.0, 124.0,
            127.0, 130.0, 133.0, 137.0, 140.0, 137.0,
        ]
    }

    #[test]
    fn table_names_scored_bar_when_tail_is_undefined() {
        let mut closes = rising_closes();
        let mut price = 137.0;
        for i in 0..14 {
            price -= if i % 3 == 0 { 0.0 } else { 1.5 };
            closes.push(price);
        }
        let reports = single_cell(&closes);
        let table = to_table(&DashboardView::new("csv", &reports, 0, Utc::now()));
        // Row 41 is the newest row with RSI defined.
        assert!(table.contains("(scored at 2024-05-02 17:00)"), "{table}");
    }

    #[test]
    fn table_omits_scored_bar_when_last_row_is_scored() {
        let reports = single_cell(&rising_closes());
        let table = to_table(&DashboardView::new("csv", &reports, 0, Utc::now()));
        assert!(!table.contains("scored at"), "{table}");
    }
}
