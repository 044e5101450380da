//! PricePulse Core: price series, resampling, indicators, signal scoring.
//!
//! This crate holds the whole analysis pipeline:
//! - Domain types (price points, validated close series, bar intervals)
//! - Epoch-aligned last-price resampler
//! - Indicator engine (SMA, EMA, RSI, MACD, Bollinger, ATR-proxy) over an `IndicatorFrame`
//! - Rule-based signal scorer with an optional trade plan
//! - Market-data providers (Yahoo Finance, CSV files, synthetic)
//! - Dashboard configuration and the symbol × interval pipeline

pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod frame;
pub mod indicators;
pub mod pipeline;
pub mod resample;
pub mod scoring;

pub use config::{AnalysisSettings, ConfigError, DashboardConfig, IntervalSpec, SymbolSpec};
pub use domain::{BarInterval, PricePoint, PriceSeries, SeriesError};
pub use engine::{EngineParams, IndicatorEngine};
pub use frame::{Field, IndicatorFrame, IndicatorRow};
pub use pipeline::{
    analyze, run_dashboard, Analysis, Analyzer, CellOutcome, CellReport, SymbolReport, Unavailable,
};
pub use scoring::{Recommendation, SignalResult, SignalScore, SignalScorer};
