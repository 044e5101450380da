//! Offline provider reading close series from CSV files.
//!
//! Layout: `{dir}/{ticker}_{interval}.csv` with a `timestamp,close` header.
//! Timestamps are RFC 3339 strings or Unix seconds. The requested range is
//! applied relative to the newest row, so exported files of any length can be
//! replayed.

use super::provider::{parse_range, series_from_samples, FetchError, FetchRequest, PriceProvider};
use crate::domain::PriceSeries;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    close: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing a request.
    pub fn path_for(&self, request: &FetchRequest) -> PathBuf {
        self.dir
            .join(format!("{}_{}.csv", request.ticker, request.interval.code()))
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl PriceProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, FetchError> {
        let path = self.path_for(request);
        if !path.exists() {
            return Err(FetchError::SymbolNotFound {
                ticker: request.ticker.clone(),
            });
        }

        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(&path)?;
        let mut samples = Vec::new();
        for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row?;
            let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| {
                FetchError::Other(format!(
                    "{}: row {}: unparseable timestamp '{}'",
                    path.display(),
                    line + 1,
                    row.timestamp
                ))
            })?;
            samples.push((timestamp, row.close.unwrap_or(f64::NAN)));
        }

        // A span reaching past the representable calendar keeps everything.
        let cutoff = parse_range(&request.range).and_then(|span| {
            samples
                .iter()
                .map(|(ts, _)| *ts)
                .max()
                .and_then(|newest| newest.checked_sub_signed(span))
        });
        if let Some(cutoff) = cutoff {
            samples.retain(|(ts, _)| *ts >= cutoff);
        }

        let series = series_from_samples(&request.ticker, samples)?;
        debug!(path = %path.display(), bars = series.len(), "loaded csv series");
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BarInterval;
    use std::fs;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn reads_unix_and_rfc3339_timestamps() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "BTC-USD_1h.csv",
            "timestamp,close\n1700000000,100.5\n2023-11-14T23:13:20Z,101.0\n",
        );
        let provider = CsvProvider::new(tmp.path());
        let series = provider
            .fetch(&FetchRequest::new("BTC-USD", BarInterval::OneHour, "max"))
            .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![100.5, 101.0]);
    }

    #[test]
    fn unsorted_rows_and_blank_closes_are_normalised() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "ETH-USD_1d.csv",
            "timestamp,close\n1700172800,3.0\n1700000000,1.0\n1700086400,\n",
        );
        let series = CsvProvider::new(tmp.path())
            .fetch(&FetchRequest::new("ETH-USD", BarInterval::OneDay, "max"))
            .unwrap();
        assert_eq!(series.closes(), vec![1.0, 3.0]);
    }

    #[test]
    fn range_trims_relative_to_newest_row() {
        let tmp = tempfile::tempdir().unwrap();
        let mut body = String::from("timestamp,close\n");
        for day in 0..10 {
            body.push_str(&format!("{},{}\n", 1_700_000_000 + day * 86_400, 100 + day));
        }
        write(tmp.path(), "SOL-USD_1d.csv", &body);
        let series = CsvProvider::new(tmp.path())
            .fetch(&FetchRequest::new("SOL-USD", BarInterval::OneDay, "3d"))
            .unwrap();
        assert_eq!(series.closes(), vec![106.0, 107.0, 108.0, 109.0]);
    }

    #[test]
    fn range_beyond_calendar_keeps_every_row() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "BTC-USD_1d.csv",
            "timestamp,close\n1700000000,1.0\n1700086400,2.0\n",
        );
        let series = CsvProvider::new(tmp.path())
            .fetch(&FetchRequest::new("BTC-USD", BarInterval::OneDay, "300000y"))
            .unwrap();
        assert_eq!(series.closes(), vec![1.0, 2.0]);
    }

    #[test]
    fn missing_file_is_symbol_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = CsvProvider::new(tmp.path())
            .fetch(&FetchRequest::new("NOPE", BarInterval::OneDay, "7d"))
            .unwrap_err();
        assert!(matches!(err, FetchError::SymbolNotFound { .. }));
    }

    #[test]
    fn bad_timestamp_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "X_1d.csv", "timestamp,close\nyesterday,1.0\n");
        let err = CsvProvider::new(tmp.path())
            .fetch(&FetchRequest::new("X", BarInterval::OneDay, "7d"))
            .unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }
}
