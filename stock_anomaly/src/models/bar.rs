//! Canonical in-memory representation of a daily bar (OHLCV).
//!
//! This struct is used as the standard output for all [`DataProvider`](crate::providers::DataProvider)
//! implementations. The feed layer converts it into [`PriceObservation`](crate::models::price::PriceObservation)s.

use chrono::{DateTime, Utc};

/// A single daily bar for a given timestamp.
///
/// This struct is vendor-agnostic. Only `close` is required; the other
/// price fields are carried through when the provider supplies them.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// The timestamp for this bar (UTC).
    pub timestamp: DateTime<Utc>,

    /// Opening price.
    pub open: Option<f64>,

    /// Highest price during the bar interval.
    pub high: Option<f64>,

    /// Lowest price during the bar interval.
    pub low: Option<f64>,

    /// Closing price.
    pub close: f64,

    /// Volume traded during the bar interval.
    pub volume: Option<f64>,

    /// Trade count for the bar. Not all providers supply this.
    pub trade_count: Option<u64>,

    /// Volume-weighted average price. Not all providers supply this.
    pub vwap: Option<f64>,
}

impl Bar {
    /// A bar with only a close price, mostly useful for tests and synthetic data.
    pub fn close_only(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self {
            timestamp,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
            trade_count: None,
            vwap: None,
        }
    }
}

/// The bars a provider returned for a single symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "AAPL").
    pub symbol: String,
    /// The collection of daily bars, in whatever order the provider produced them.
    pub bars: Vec<Bar>,
}
