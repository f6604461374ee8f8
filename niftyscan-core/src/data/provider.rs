//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Yahoo Finance, CSV import)
//! so we can swap implementations and mock for tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::normalize::RawFrame;

/// Structured error types for data operations.
///
/// These are designed to be displayable in both CLI and TUI contexts.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("csv import error: {0}")]
    CsvImport(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Fixed query parameters for an intraday fetch.
///
/// Part of the fetch cache key together with the symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Trailing calendar days.
    pub range_days: u32,
    /// Bar granularity in minutes.
    pub interval_minutes: u32,
    /// Adjust prices for corporate actions.
    pub adjust: bool,
}

impl FetchRequest {
    /// Interval values the chart API accepts for intraday bars.
    pub const SUPPORTED_INTERVALS: [u32; 7] = [1, 2, 5, 15, 30, 60, 90];

    pub fn range_param(&self) -> String {
        format!("{}d", self.range_days)
    }

    pub fn interval_param(&self) -> String {
        format!("{}m", self.interval_minutes)
    }
}

impl Default for FetchRequest {
    fn default() -> Self {
        Self {
            range_days: 5,
            interval_minutes: 5,
            adjust: false,
        }
    }
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

impl DataSource {
    pub fn label(self) -> &'static str {
        match self {
            DataSource::YahooFinance => "Yahoo Finance",
            DataSource::CsvImport => "CSV import",
            DataSource::Synthetic => "synthetic",
        }
    }
}

/// Trait for data providers (Yahoo Finance, CSV import, etc).
///
/// Implementations return the provider's table as-is; column flattening and
/// bar construction happen in [`super::normalize`]. An empty frame means the
/// instrument had no bars in the requested window.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Which source label to show next to the results.
    fn source(&self) -> DataSource;

    /// Fetch intraday OHLCV columns for a symbol.
    fn fetch(&self, symbol: &str, request: &FetchRequest) -> Result<RawFrame, DataError>;

    /// Drop state carried over from earlier cycles, such as a tripped
    /// circuit breaker. Called at the start of every refresh.
    fn reset(&self) {}
}
