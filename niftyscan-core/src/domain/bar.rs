//! Bar: the fundamental market data unit.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol at a single intraday timestamp.
///
/// `timestamp` is the exchange-local wall clock as returned by the provider.
/// Prices are unadjusted; no corporate-action adjustment is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Wall-clock time of day of this bar.
    pub fn time_of_day(&self) -> NaiveTime {
        self.timestamp.time()
    }
}
