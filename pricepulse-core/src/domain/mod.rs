//! Domain types for PricePulse

pub mod interval;
pub mod price;

pub use interval::{BarInterval, IntervalParseError};
pub use price::{PricePoint, PriceSeries, SeriesError};
