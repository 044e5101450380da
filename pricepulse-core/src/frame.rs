//! IndicatorFrame: the price series augmented with aligned indicator columns.
//!
//! Rows are typed records: each indicator has its own optional field, so a
//! missing value is `None` and can never be confused with zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Named column of an `IndicatorRow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Close,
    Sma,
    Ema,
    Rsi,
    Macd,
    MacdSignal,
    MacdHistogram,
    BbMid,
    BbUp,
    BbLow,
    AtrProxy,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Close => "close",
            Field::Sma => "sma",
            Field::Ema => "ema",
            Field::Rsi => "rsi",
            Field::Macd => "macd",
            Field::MacdSignal => "macd_signal",
            Field::MacdHistogram => "macd_histogram",
            Field::BbMid => "bb_mid",
            Field::BbUp => "bb_up",
            Field::BbLow => "bb_low",
            Field::AtrProxy => "atr_proxy",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bar of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub sma: Option<f64>,
    pub ema: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub bb_mid: Option<f64>,
    pub bb_up: Option<f64>,
    pub bb_low: Option<f64>,
    pub atr_proxy: Option<f64>,
}

impl IndicatorRow {
    /// A row carrying only the price.
    pub fn bare(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self {
            timestamp,
            close,
            sma: None,
            ema: None,
            rsi: None,
            macd: None,
            macd_signal: None,
            macd_histogram: None,
            bb_mid: None,
            bb_up: None,
            bb_low: None,
            atr_proxy: None,
        }
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::Close => Some(self.close),
            Field::Sma => self.sma,
            Field::Ema => self.ema,
            Field::Rsi => self.rsi,
            Field::Macd => self.macd,
            Field::MacdSignal => self.macd_signal,
            Field::MacdHistogram => self.macd_histogram,
            Field::BbMid => self.bb_mid,
            Field::BbUp => self.bb_up,
            Field::BbLow => self.bb_low,
            Field::AtrProxy => self.atr_proxy,
        }
    }

    pub(crate) fn slot_mut(&mut self, field: Field) -> Option<&mut Option<f64>> {
        match field {
            Field::Close => None,
            Field::Sma => Some(&mut self.sma),
            Field::Ema => Some(&mut self.ema),
            Field::Rsi => Some(&mut self.rsi),
            Field::Macd => Some(&mut self.macd),
            Field::MacdSignal => Some(&mut self.macd_signal),
            Field::MacdHistogram => Some(&mut self.macd_histogram),
            Field::BbMid => Some(&mut self.bb_mid),
            Field::BbUp => Some(&mut self.bb_up),
            Field::BbLow => Some(&mut self.bb_low),
            Field::AtrProxy => Some(&mut self.atr_proxy),
        }
    }

    /// True when every listed field is defined on this row.
    pub fn has_all(&self, fields: &[Field]) -> bool {
        fields.iter().all(|&f| self.get(f).is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("column '{name}' has {got} values but the frame has {expected} rows")]
    LengthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("column '{0}' already exists")]
    DuplicateColumn(String),
}

/// Price rows plus indicator columns, aligned by timestamp.
///
/// Owned by the call that built it. The only mutation allowed after
/// construction is adding further derived columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorFrame {
    rows: Vec<IndicatorRow>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    extra: BTreeMap<String, Vec<Option<f64>>>,
}

impl IndicatorFrame {
    pub(crate) fn from_rows(rows: Vec<IndicatorRow>) -> Self {
        Self {
            rows,
            extra: BTreeMap::new(),
        }
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    /// A built-in column as a vector.
    pub fn column(&self, field: Field) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.get(field)).collect()
    }

    /// Add a derived column. Its length must match the row count.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<(), FrameError> {
        let name = name.into();
        if values.len() != self.rows.len() {
            return Err(FrameError::LengthMismatch {
                name,
                expected: self.rows.len(),
                got: values.len(),
            });
        }
        if self.extra.contains_key(&name) || is_builtin(&name) {
            return Err(FrameError::DuplicateColumn(name));
        }
        self.extra.insert(name, values);
        Ok(())
    }

    /// A derived column added through `add_column`.
    pub fn extra_column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.extra.get(name).map(|v| v.as_slice())
    }

    pub fn extra_names(&self) -> impl Iterator<Item = &str> {
        self.extra.keys().map(|k| k.as_str())
    }

    /// Index of the most recent row on which every listed field is defined.
    pub fn last_complete_index(&self, fields: &[Field]) -> Option<usize> {
        self.rows.iter().rposition(|r| r.has_all(fields))
    }

    /// Chart feed: the trailing `limit` rows with close, SMA and EMA all defined.
    pub fn chart_rows(&self, limit: usize) -> Vec<&IndicatorRow> {
        let complete: Vec<&IndicatorRow> = self
            .rows
            .iter()
            .filter(|r| r.has_all(&[Field::Sma, Field::Ema]))
            .collect();
        let skip = complete.len().saturating_sub(limit);
        complete.into_iter().skip(skip).collect()
    }
}

fn is_builtin(name: &str) -> bool {
    [
        Field::Close,
        Field::Sma,
        Field::Ema,
        Field::Rsi,
        Field::Macd,
        Field::MacdSignal,
        Field::MacdHistogram,
        Field::BbMid,
        Field::BbUp,
        Field::BbLow,
        Field::AtrProxy,
    ]
    .iter()
    .any(|f| f.as_str() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn frame(n: usize) -> IndicatorFrame {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let rows = (0..n)
            .map(|i| {
                let mut row = IndicatorRow::bare(base + Duration::hours(i as i64), 100.0 + i as f64);
                if i >= 2 {
                    row.sma = Some(1.0);
                }
                row.ema = Some(2.0);
                if i == 3 {
                    row.rsi = Some(55.0);
                }
                row
            })
            .collect();
        IndicatorFrame::from_rows(rows)
    }

    #[test]
    fn row_get_maps_fields() {
        let f = frame(4);
        let row = f.last().unwrap();
        assert_eq!(row.get(Field::Close), Some(103.0));
        assert_eq!(row.get(Field::Rsi), Some(55.0));
        assert_eq!(row.get(Field::Macd), None);
    }

    #[test]
    fn last_complete_index_scans_backwards() {
        let f = frame(6);
        assert_eq!(f.last_complete_index(&[Field::Sma, Field::Rsi]), Some(3));
        assert_eq!(f.last_complete_index(&[Field::Sma]), Some(5));
        assert_eq!(f.last_complete_index(&[Field::Macd]), None);
    }

    #[test]
    fn chart_rows_takes_defined_tail() {
        let f = frame(6);
        let rows = f.chart_rows(3);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].close, 103.0);
        assert_eq!(f.chart_rows(100).len(), 4);
    }

    #[test]
    fn add_column_checks_length_and_names() {
        let mut f = frame(3);
        assert!(f.add_column("spread", vec![None, Some(1.0), Some(2.0)]).is_ok());
        assert_eq!(f.extra_column("spread").unwrap()[1], Some(1.0));
        assert_eq!(
            f.add_column("spread", vec![None; 3]),
            Err(FrameError::DuplicateColumn("spread".into()))
        );
        assert_eq!(
            f.add_column("rsi", vec![None; 3]),
            Err(FrameError::DuplicateColumn("rsi".into()))
        );
        assert!(matches!(
            f.add_column("short", vec![None]),
            Err(FrameError::LengthMismatch { expected: 3, got: 1, .. })
        ));
    }

    #[test]
    fn column_extracts_values() {
        let f = frame(3);
        assert_eq!(f.column(Field::Sma), vec![None, None, Some(1.0)]);
    }
}
