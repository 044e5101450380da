//! Price provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over data sources (Yahoo Finance, CSV
//! files, synthetic data) so the pipeline can be driven by any of them and
//! mocked in tests.

use crate::domain::{BarInterval, PriceSeries, SeriesError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What to fetch: one ticker at one bar size over a lookback range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub ticker: String,
    pub interval: BarInterval,
    /// Lookback in provider vocabulary ("7d", "90d", "2y", "max").
    pub range: String,
}

impl FetchRequest {
    pub fn new(ticker: impl Into<String>, interval: BarInterval, range: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            interval,
            range: range.into(),
        }
    }
}

/// Structured error types for data operations.
///
/// Displayable in CLI output and carried into unavailable dashboard cells.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {ticker}")]
    SymbolNotFound { ticker: String },

    #[error("provider does not serve {interval} bars")]
    UnsupportedInterval { interval: BarInterval },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("provider returned no prices for {ticker}")]
    EmptyPayload { ticker: String },

    #[error("invalid price series: {0}")]
    InvalidSeries(#[from] SeriesError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for price providers (Yahoo Finance, CSV files, etc).
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the close series for a request.
    fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, FetchError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }
}

/// Parse a lookback range such as "7d", "12h", "2wk", "3mo", "1y".
///
/// Returns `None` for "max", anything unrecognised, or a span too large to
/// represent (no trimming).
pub fn parse_range(range: &str) -> Option<Duration> {
    let range = range.trim().to_ascii_lowercase();
    let split = range.find(|c: char| !c.is_ascii_digit())?;
    let (num, unit) = range.split_at(split);
    let n: i64 = num.parse().ok()?;
    match unit {
        "m" | "min" => Duration::try_minutes(n),
        "h" => Duration::try_hours(n),
        "d" => Duration::try_days(n),
        "w" | "wk" => Duration::try_weeks(n),
        "mo" => Duration::try_days(n.checked_mul(30)?),
        "y" => Duration::try_days(n.checked_mul(365)?),
        _ => None,
    }
}

/// Turn raw provider samples into a validated series.
///
/// Drops samples without a usable close (null/NaN), sorts by time, and keeps
/// the last sample for a repeated timestamp (providers re-send the live bar).
pub fn series_from_samples(
    ticker: &str,
    mut samples: Vec<(DateTime<Utc>, f64)>,
) -> Result<PriceSeries, FetchError> {
    samples.retain(|(_, close)| close.is_finite());
    if samples.is_empty() {
        return Err(FetchError::EmptyPayload {
            ticker: ticker.to_string(),
        });
    }
    samples.sort_by_key(|(ts, _)| *ts);

    let mut deduped: Vec<(DateTime<Utc>, f64)> = Vec::with_capacity(samples.len());
    for (ts, close) in samples {
        match deduped.last_mut() {
            Some(last) if last.0 == ts => last.1 = close,
            _ => deduped.push((ts, close)),
        }
    }

    Ok(PriceSeries::from_pairs(deduped)?)
}
