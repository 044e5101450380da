//! Fetch → resample → indicators → score, per symbol × interval.
//!
//! `Analyzer::analyze` is pure and re-entrant. `run_dashboard` walks the
//! configured grid sequentially; each cell is independent, and a failure in
//! one cell is recorded as `Unavailable` without touching the others.

use crate::config::{AnalysisSettings, ConfigError, DashboardConfig, IntervalSpec, SymbolSpec};
use crate::data::{FetchError, PriceProvider};
use crate::domain::{BarInterval, PriceSeries};
use crate::engine::IndicatorEngine;
use crate::frame::{IndicatorFrame, IndicatorRow};
use crate::resample::resample_to;
use crate::scoring::{SignalResult, SignalScorer};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Result of analysing one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Bar size of the analysed (possibly resampled) series.
    pub interval: BarInterval,
    pub bars: usize,
    pub frame: IndicatorFrame,
    pub signal: SignalResult,
}

impl Analysis {
    /// Last price of the analysed series.
    pub fn last_close(&self) -> Option<f64> {
        self.frame.last().map(|r| r.close)
    }

    /// Chart feed: trailing rows with close, SMA and EMA defined.
    pub fn chart(&self, limit: usize) -> Vec<&IndicatorRow> {
        self.frame.chart_rows(limit)
    }
}

/// Why a cell carries no analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Unavailable {
    #[error("fetch failed: {message}")]
    FetchFailed { message: String },

    #[error("no price data")]
    EmptySeries,

    #[error("insufficient data: {bars} bars, need at least {required}")]
    TooFewBars { bars: usize, required: usize },

    #[error("invalid analysis settings: {message}")]
    InvalidSettings { message: String },
}

impl From<FetchError> for Unavailable {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::EmptyPayload { .. } => Unavailable::EmptySeries,
            other => Unavailable::FetchFailed {
                message: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum CellOutcome {
    Ready(Analysis),
    Unavailable(Unavailable),
}

impl CellOutcome {
    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            CellOutcome::Ready(a) => Some(a),
            CellOutcome::Unavailable(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, CellOutcome::Ready(_))
    }
}

impl From<Result<Analysis, Unavailable>> for CellOutcome {
    fn from(result: Result<Analysis, Unavailable>) -> Self {
        match result {
            Ok(analysis) => CellOutcome::Ready(analysis),
            Err(reason) => CellOutcome::Unavailable(reason),
        }
    }
}

/// One symbol × interval cell of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellReport {
    pub key: String,
    pub label: String,
    pub outcome: CellOutcome,
}

/// All interval cells of one symbol, in configured order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolReport {
    pub name: String,
    pub ticker: String,
    pub cells: Vec<CellReport>,
}

impl SymbolReport {
    pub fn cell(&self, key: &str) -> Option<&CellReport> {
        self.cells.iter().find(|c| c.key == key)
    }
}

/// Validated engine and scorer built from `AnalysisSettings`.
#[derive(Debug)]
pub struct Analyzer {
    settings: AnalysisSettings,
    engine: IndicatorEngine,
    scorer: SignalScorer,
}

impl Analyzer {
    pub fn new(settings: AnalysisSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let engine = IndicatorEngine::new(settings.engine.clone())?;
        let mut scorer = SignalScorer::new(settings.rules.clone());
        if let Some(plan) = &settings.trade_plan {
            scorer = scorer.with_trade_plan(plan.clone());
        }
        Ok(Self {
            settings,
            engine,
            scorer,
        })
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Resample if the interval asks for it, check history, compute, score.
    pub fn analyze(
        &self,
        series: &PriceSeries,
        spec: &IntervalSpec,
    ) -> Result<Analysis, Unavailable> {
        let series = match spec.resample {
            Some(target) if target != spec.fetch_interval => resample_to(series, target),
            _ => series.clone(),
        };

        if series.is_empty() {
            return Err(Unavailable::EmptySeries);
        }
        let required = self.settings.min_bars.max(1);
        if series.len() < required {
            return Err(Unavailable::TooFewBars {
                bars: series.len(),
                required,
            });
        }

        let frame = self.engine.compute(&series);
        let signal = self.scorer.score(&frame);
        Ok(Analysis {
            interval: spec.bar_interval(),
            bars: series.len(),
            frame,
            signal,
        })
    }
}

/// One-shot analysis with freshly built engine and scorer.
pub fn analyze(
    series: &PriceSeries,
    spec: &IntervalSpec,
    settings: &AnalysisSettings,
) -> Result<Analysis, Unavailable> {
    let analyzer = Analyzer::new(settings.clone()).map_err(|e| Unavailable::InvalidSettings {
        message: e.to_string(),
    })?;
    analyzer.analyze(series, spec)
}

fn run_cell(
    provider: &dyn PriceProvider,
    analyzer: &Analyzer,
    symbol: &SymbolSpec,
    spec: &IntervalSpec,
) -> CellOutcome {
    let request = spec.fetch_request(&symbol.ticker);
    let result = provider
        .fetch(&request)
        .map_err(Unavailable::from)
        .and_then(|series| analyzer.analyze(&series, spec));

    match &result {
        Ok(analysis) => debug!(
            ticker = %symbol.ticker,
            interval = %spec.key,
            bars = analysis.bars,
            probability = ?analysis.signal.probability(),
            "cell ready"
        ),
        Err(reason) => warn!(
            ticker = %symbol.ticker,
            interval = %spec.key,
            %reason,
            "cell unavailable"
        ),
    }
    result.into()
}

/// Run every symbol × interval cell of `config` against `provider`.
///
/// Only an invalid configuration fails the run; per-cell problems are
/// reported inside the returned reports.
pub fn run_dashboard(
    provider: &dyn PriceProvider,
    config: &DashboardConfig,
) -> Result<Vec<SymbolReport>, ConfigError> {
    config.validate()?;
    let analyzer = Analyzer::new(config.analysis.clone())?;

    info!(
        provider = provider.name(),
        symbols = config.symbols.len(),
        intervals = config.intervals.len(),
        "dashboard run started"
    );

    let reports: Vec<SymbolReport> = config
        .symbols
        .iter()
        .map(|symbol| SymbolReport {
            name: symbol.name.clone(),
            ticker: symbol.ticker.clone(),
            cells: config
                .intervals
                .iter()
                .map(|spec| CellReport {
                    key: spec.key.clone(),
                    label: spec.label.clone(),
                    outcome: run_cell(provider, &analyzer, symbol, spec),
                })
                .collect(),
        })
        .collect();

    let ready = reports
        .iter()
        .flat_map(|r| &r.cells)
        .filter(|c| c.outcome.is_ready())
        .count();
    let total = config.symbols.len() * config.intervals.len();
    info!(ready, unavailable = total - ready, "dashboard run finished");

    Ok(reports)
}
