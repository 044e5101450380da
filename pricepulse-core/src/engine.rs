//! Indicator engine: computes the fixed indicator palette over a price series.
//!
//! Every column is computed once over the full close column and then written
//! into the typed rows of an `IndicatorFrame`. Insufficient history never
//! fails; it only leaves more leading rows undefined.

use crate::domain::PriceSeries;
use crate::frame::{Field, IndicatorFrame, IndicatorRow};
use crate::indicators::{AtrProxy, Bollinger, Ema, Indicator, Macd, Rsi, Sma};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Window parameters of the indicator palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    pub sma_period: usize,
    pub ema_period: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_period: usize,
    pub bb_multiplier: f64,
    pub atr_period: usize,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            sma_period: 20,
            ema_period: 20,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bb_period: 20,
            bb_multiplier: 2.0,
            atr_period: 14,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("{name} must be >= {min} (got {value})")]
    TooSmall {
        name: &'static str,
        min: usize,
        value: usize,
    },

    #[error("macd_fast ({fast}) must be shorter than macd_slow ({slow})")]
    MacdOrder { fast: usize, slow: usize },

    #[error("bb_multiplier must be finite and >= 0 (got {0})")]
    BandMultiplier(f64),
}

impl EngineParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        let checks = [
            ("sma_period", self.sma_period, 1),
            ("ema_period", self.ema_period, 1),
            ("rsi_period", self.rsi_period, 1),
            ("macd_fast", self.macd_fast, 1),
            ("macd_slow", self.macd_slow, 1),
            ("macd_signal", self.macd_signal, 1),
            ("bb_period", self.bb_period, 2),
            ("atr_period", self.atr_period, 1),
        ];
        for (name, value, min) in checks {
            if value < min {
                return Err(ParamError::TooSmall { name, min, value });
            }
        }
        if self.macd_fast >= self.macd_slow {
            return Err(ParamError::MacdOrder {
                fast: self.macd_fast,
                slow: self.macd_slow,
            });
        }
        if !self.bb_multiplier.is_finite() || self.bb_multiplier < 0.0 {
            return Err(ParamError::BandMultiplier(self.bb_multiplier));
        }
        Ok(())
    }
}

/// The configured indicator palette, one instance per output column.
///
/// MACD and Bollinger columns share one pass each in `compute`; their
/// per-line instances stay in `columns` for naming and warmup.
pub struct IndicatorEngine {
    params: EngineParams,
    columns: Vec<(Field, Box<dyn Indicator>)>,
    macd: Macd,
    bands: Bollinger,
}

impl std::fmt::Debug for IndicatorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatorEngine")
            .field("params", &self.params)
            .field("columns", &self.column_names())
            .finish()
    }
}

impl IndicatorEngine {
    pub fn new(params: EngineParams) -> Result<Self, ParamError> {
        params.validate()?;
        let p = &params;
        let columns: Vec<(Field, Box<dyn Indicator>)> = vec![
            (Field::Sma, Box::new(Sma::new(p.sma_period))),
            (Field::Ema, Box::new(Ema::new(p.ema_period))),
            (Field::Rsi, Box::new(Rsi::new(p.rsi_period))),
            (
                Field::Macd,
                Box::new(Macd::line(p.macd_fast, p.macd_slow, p.macd_signal)),
            ),
            (
                Field::MacdSignal,
                Box::new(Macd::signal(p.macd_fast, p.macd_slow, p.macd_signal)),
            ),
            (
                Field::MacdHistogram,
                Box::new(Macd::histogram(p.macd_fast, p.macd_slow, p.macd_signal)),
            ),
            (
                Field::BbMid,
                Box::new(Bollinger::middle(p.bb_period, p.bb_multiplier)),
            ),
            (
                Field::BbUp,
                Box::new(Bollinger::upper(p.bb_period, p.bb_multiplier)),
            ),
            (
                Field::BbLow,
                Box::new(Bollinger::lower(p.bb_period, p.bb_multiplier)),
            ),
            (Field::AtrProxy, Box::new(AtrProxy::new(p.atr_period))),
        ];
        let macd = Macd::line(p.macd_fast, p.macd_slow, p.macd_signal);
        let bands = Bollinger::middle(p.bb_period, p.bb_multiplier);
        Ok(Self {
            params,
            columns,
            macd,
            bands,
        })
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Indicator names in column order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(_, ind)| ind.name()).collect()
    }

    /// Leading rows that stay undefined for the given fields.
    pub fn warmup(&self, fields: &[Field]) -> usize {
        self.columns
            .iter()
            .filter(|(field, _)| fields.contains(field))
            .map(|(_, ind)| ind.lookback())
            .max()
            .unwrap_or(0)
    }

    /// Compute every column over `series`.
    pub fn compute(&self, series: &PriceSeries) -> IndicatorFrame {
        let closes = series.closes();
        let mut rows: Vec<IndicatorRow> = series
            .points()
            .iter()
            .map(|p| IndicatorRow::bare(p.timestamp, p.close))
            .collect();

        let (mut macd, mut macd_signal, mut macd_hist) = self.macd.compute_all(&closes);
        let (mut bb_mid, mut bb_up, mut bb_low) = self.bands.compute_all(&closes);
        let defined = |values: Vec<f64>| values.into_iter().map(Some).collect::<Vec<_>>();

        for (field, indicator) in &self.columns {
            let values = match field {
                Field::Macd => defined(std::mem::take(&mut macd)),
                Field::MacdSignal => defined(std::mem::take(&mut macd_signal)),
                Field::MacdHistogram => defined(std::mem::take(&mut macd_hist)),
                Field::BbMid => std::mem::take(&mut bb_mid),
                Field::BbUp => std::mem::take(&mut bb_up),
                Field::BbLow => std::mem::take(&mut bb_low),
                _ => indicator.compute(&closes),
            };
            debug_assert_eq!(
                values.len(),
                rows.len(),
                "indicator '{}' produced {} values for {} rows",
                indicator.name(),
                values.len(),
                rows.len()
            );
            for (row, value) in rows.iter_mut().zip(values) {
                if let Some(slot) = row.slot_mut(*field) {
                    *slot = value;
                }
            }
        }

        debug!(rows = rows.len(), columns = self.columns.len(), "computed indicator frame");
        IndicatorFrame::from_rows(rows)
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        // Canonical parameters always validate.
        match Self::new(EngineParams::default()) {
            Ok(engine) => engine,
            Err(e) => unreachable!("default engine params rejected: {e}"),
        }
    }
}
