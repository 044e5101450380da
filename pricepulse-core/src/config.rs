//! Dashboard configuration: which symbols, which intervals, how to analyse.
//!
//! Stored as TOML. The configuration is a plain value passed into the
//! pipeline entry point; nothing reads it from global state.

use crate::data::FetchRequest;
use crate::domain::BarInterval;
use crate::engine::{EngineParams, ParamError};
use crate::scoring::{Rule, RuleSet, TradePlanParams};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("config lists no symbols")]
    NoSymbols,

    #[error("config lists no intervals")]
    NoIntervals,

    #[error("duplicate symbol '{0}'")]
    DuplicateSymbol(String),

    #[error("duplicate interval key '{0}'")]
    DuplicateInterval(String),

    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),

    #[error("interval '{key}': cannot resample {fetch} bars to finer {resample} bars")]
    ResampleFinerThanFetch {
        key: String,
        fetch: BarInterval,
        resample: BarInterval,
    },

    #[error("invalid engine parameters: {0}")]
    Engine(#[from] ParamError),

    #[error("invalid trade plan: {0}")]
    TradePlan(String),

    #[error("rule set is empty")]
    NoRules,

    #[error("rule '{0}' is listed more than once")]
    DuplicateRule(&'static str),

    #[error("RSI thresholds must satisfy 0 <= oversold ({oversold}) < overbought ({overbought}) <= 100")]
    RsiThresholds { oversold: f64, overbought: f64 },
}

/// A tracked asset: display name and provider ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSpec {
    pub name: String,
    pub ticker: String,
}

impl SymbolSpec {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
        }
    }

    /// Case-insensitive match on name or ticker.
    pub fn matches(&self, query: &str) -> bool {
        self.name.eq_ignore_ascii_case(query) || self.ticker.eq_ignore_ascii_case(query)
    }
}

/// One dashboard column: what to fetch and the bar size to analyse at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalSpec {
    pub key: String,
    pub label: String,
    pub fetch_interval: BarInterval,
    pub range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resample: Option<BarInterval>,
}

impl IntervalSpec {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        fetch_interval: BarInterval,
        range: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            fetch_interval,
            range: range.into(),
            resample: None,
        }
    }

    pub fn resampled_to(mut self, target: BarInterval) -> Self {
        self.resample = Some(target);
        self
    }

    /// Bar size of the analysed series.
    pub fn bar_interval(&self) -> BarInterval {
        self.resample.unwrap_or(self.fetch_interval)
    }

    pub fn fetch_request(&self, ticker: &str) -> FetchRequest {
        FetchRequest::new(ticker, self.fetch_interval, self.range.clone())
    }
}

/// Engine, rules and guards applied to every cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Below this many bars (after resampling) a cell is reported unavailable.
    pub min_bars: usize,
    /// Rows of the indicator frame kept for charting.
    pub chart_tail: usize,
    pub engine: EngineParams,
    pub rules: RuleSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_plan: Option<TradePlanParams>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            min_bars: 10,
            chart_tail: 200,
            engine: EngineParams::default(),
            rules: RuleSet::canonical(),
            trade_plan: Some(TradePlanParams::default()),
        }
    }
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if self.rules.is_empty() {
            return Err(ConfigError::NoRules);
        }
        if let Some(kind) = self.rules.duplicate_kind() {
            return Err(ConfigError::DuplicateRule(kind));
        }
        for rule in self.rules.rules() {
            if let Rule::RsiExtremes {
                oversold,
                overbought,
            } = *rule
            {
                let in_range = |v: f64| (0.0..=100.0).contains(&v);
                if !in_range(oversold) || !in_range(overbought) || oversold >= overbought {
                    return Err(ConfigError::RsiThresholds {
                        oversold,
                        overbought,
                    });
                }
            }
        }
        if let Some(plan) = &self.trade_plan {
            let positive = |v: f64| v.is_finite() && v > 0.0;
            if !positive(plan.atr_multiplier) || !positive(plan.reward_ratio) {
                return Err(ConfigError::TradePlan(format!(
                    "atr_multiplier ({}) and reward_ratio ({}) must be finite and > 0",
                    plan.atr_multiplier, plan.reward_ratio
                )));
            }
        }
        Ok(())
    }
}

/// The complete dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub symbols: Vec<SymbolSpec>,
    pub intervals: Vec<IntervalSpec>,
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            symbols: vec![
                SymbolSpec::new("Bitcoin", "BTC-USD"),
                SymbolSpec::new("Ethereum", "ETH-USD"),
                SymbolSpec::new("Solana", "SOL-USD"),
            ],
            intervals: vec![
                IntervalSpec::new("15m", "15 Minutes", BarInterval::FifteenMinutes, "7d"),
                IntervalSpec::new("1h", "1 Hour", BarInterval::OneHour, "30d"),
                IntervalSpec::new("4h", "4 Hours", BarInterval::OneHour, "90d")
                    .resampled_to(BarInterval::FourHours),
                IntervalSpec::new("24h", "24 Hours", BarInterval::OneDay, "730d"),
            ],
            analysis: AnalysisSettings::default(),
        }
    }
}

impl DashboardConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        if self.intervals.is_empty() {
            return Err(ConfigError::NoIntervals);
        }

        let mut seen = HashSet::new();
        for symbol in &self.symbols {
            if !seen.insert(symbol.ticker.to_ascii_uppercase()) {
                return Err(ConfigError::DuplicateSymbol(symbol.ticker.clone()));
            }
        }

        let mut keys = HashSet::new();
        for interval in &self.intervals {
            if !keys.insert(interval.key.as_str()) {
                return Err(ConfigError::DuplicateInterval(interval.key.clone()));
            }
            if let Some(target) = interval.resample {
                if target.seconds() < interval.fetch_interval.seconds() {
                    return Err(ConfigError::ResampleFinerThanFetch {
                        key: interval.key.clone(),
                        fetch: interval.fetch_interval,
                        resample: target,
                    });
                }
            }
        }

        self.analysis.validate()
    }

    /// Keep only the symbols matching `queries` (name or ticker), in config order.
    pub fn select_symbols<S: AsRef<str>>(&mut self, queries: &[S]) -> Result<(), ConfigError> {
        if queries.is_empty() {
            return Ok(());
        }
        for query in queries {
            let query = query.as_ref();
            if !self.symbols.iter().any(|s| s.matches(query)) {
                return Err(ConfigError::UnknownSymbol(query.to_string()));
            }
        }
        self.symbols
            .retain(|s| queries.iter().any(|q| s.matches(q.as_ref())));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = DashboardConfig::default();
        config.validate().unwrap();
        assert_eq!(config.symbols.len(), 3);
        assert_eq!(config.intervals.len(), 4);
        assert_eq!(config.intervals[2].bar_interval(), BarInterval::FourHours);
        assert_eq!(config.intervals[2].fetch_interval, BarInterval::OneHour);
    }

    #[test]
    fn toml_roundtrip() {
        let config = DashboardConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = DashboardConfig::from_toml(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_fills_analysis_defaults() {
        let config = DashboardConfig::from_toml(
            r#"
            [[symbols]]
            name = "Bitcoin"
            ticker = "BTC-USD"

            [[intervals]]
            key = "1h"
            label = "1 Hour"
            fetch_interval = "1h"
            range = "30d"
            "#,
        )
        .unwrap();
        assert_eq!(config.analysis, AnalysisSettings::default());
        assert_eq!(config.intervals[0].resample, None);
    }

    #[test]
    fn rejects_duplicate_interval_keys() {
        let mut config = DashboardConfig::default();
        config.intervals[1].key = "15m".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateInterval(k)) if k == "15m"
        ));
    }

    #[test]
    fn rejects_resampling_to_finer_bars() {
        let mut config = DashboardConfig::default();
        config.intervals[3].resample = Some(BarInterval::OneHour);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ResampleFinerThanFetch { .. })
        ));
    }

    #[test]
    fn rejects_bad_engine_params() {
        let mut config = DashboardConfig::default();
        config.analysis.engine.macd_fast = 30;
        assert!(matches!(config.validate(), Err(ConfigError::Engine(_))));
    }

    #[test]
    fn rejects_empty_lists() {
        let mut config = DashboardConfig::default();
        config.symbols.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoSymbols)));
    }

    #[test]
    fn rejects_rule_listed_twice() {
        let config = DashboardConfig::from_toml(
            r#"
            [[symbols]]
            name = "Bitcoin"
            ticker = "BTC-USD"

            [[intervals]]
            key = "1h"
            label = "1 Hour"
            fetch_interval = "1h"
            range = "30d"

            [analysis]
            rules = [{ type = "price_above_sma" }, { type = "price_above_sma" }]
            "#,
        );
        assert!(matches!(
            config,
            Err(ConfigError::DuplicateRule("price_above_sma"))
        ));
    }

    #[test]
    fn rejects_bad_rsi_thresholds() {
        let mut config = DashboardConfig::default();
        for (oversold, overbought) in [(70.0, 30.0), (50.0, 50.0), (-1.0, 70.0), (30.0, f64::NAN)] {
            config.analysis.rules = RuleSet::new(vec![Rule::RsiExtremes {
                oversold,
                overbought,
            }]);
            assert!(
                matches!(config.validate(), Err(ConfigError::RsiThresholds { .. })),
                "accepted {oversold}/{overbought}"
            );
        }
        config.analysis.rules = RuleSet::new(vec![Rule::RsiExtremes {
            oversold: 20.0,
            overbought: 80.0,
        }]);
        config.validate().unwrap();
    }

    #[test]
    fn select_symbols_by_name_or_ticker() {
        let mut config = DashboardConfig::default();
        config.select_symbols(&["sol-usd", "bitcoin"]).unwrap();
        let tickers: Vec<&str> = config.symbols.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["BTC-USD", "SOL-USD"]);

        let err = config.select_symbols(&["DOGE"]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSymbol(_)));
    }

    #[test]
    fn from_file_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            DashboardConfig::from_file(&missing),
            Err(ConfigError::Read { .. })
        ));
    }
}
