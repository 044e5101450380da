//! Market-data providers.
//!
//! The pipeline only sees the `PriceProvider` trait; concrete sources are
//! Yahoo's chart API, local CSV files, and a deterministic synthetic walk.

pub mod circuit_breaker;
pub mod csv_provider;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use csv_provider::CsvProvider;
pub use provider::{parse_range, series_from_samples, FetchError, FetchRequest, PriceProvider};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
