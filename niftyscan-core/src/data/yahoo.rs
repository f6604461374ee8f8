//! Yahoo Finance intraday provider.
//!
//! Fetches 5-minute OHLCV bars from Yahoo's v8 chart API. Handles rate
//! limiting, optional retries with exponential backoff, response parsing, and
//! the circuit breaker.
//!
//! Each chart result becomes one column group with headers `[field, symbol]`,
//! so the normalizer decides which instrument's columns feed the bars.
//! Timestamps are shifted by the exchange `gmtoffset` to the exchange-local
//! wall clock. The response carries a single current offset and it is applied
//! to every bar in the window, which holds for exchanges without daylight
//! saving such as NSE (IST, +05:30 all year). A window spanning a DST change
//! on another exchange would shift the bars on the far side by the difference.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Deserialize;

use super::circuit_breaker::CircuitBreaker;
use super::normalize::{ColumnHeader, RawFrame};
use super::provider::{DataError, DataProvider, DataSource, FetchRequest};

const CHART_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>, timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            max_retries: 0,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Retry transient failures up to `max_retries` times (default: none).
    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Build the chart API URL for a symbol and request.
    fn chart_url(symbol: &str, request: &FetchRequest) -> String {
        format!(
            "{CHART_BASE_URL}/{symbol}?range={}&interval={}&includePrePost=false\
             &includeAdjustedClose={}",
            request.range_param(),
            request.interval_param(),
            request.adjust
        )
    }

    /// Parse the chart API response into a raw frame.
    fn parse_response(
        symbol: &str,
        request: &FetchRequest,
        resp: ChartResponse,
    ) -> Result<RawFrame, DataError> {
        let results = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let mut frame = RawFrame::default();

        for data in results {
            // No timestamps: the instrument did not trade in the window
            let Some(timestamps) = data.timestamp else {
                continue;
            };
            let (result_symbol, gmtoffset) = match data.meta {
                Some(meta) => (meta.symbol.unwrap_or_else(|| symbol.to_string()), meta.gmtoffset),
                None => (symbol.to_string(), 0),
            };

            let index = timestamps
                .iter()
                .map(|&ts| local_timestamp(ts, gmtoffset))
                .collect::<Result<Vec<_>, _>>()?;

            if frame.is_empty() {
                frame.index = index;
            } else if frame.index != index {
                tracing::debug!(
                    symbol,
                    other = %result_symbol,
                    "skipping chart result with a different timestamp index"
                );
                continue;
            }

            let quote = data
                .indicators
                .quote
                .into_iter()
                .next()
                .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;
            let adj_closes = data
                .indicators
                .adjclose
                .and_then(|v| v.into_iter().next())
                .map(|a| a.adjclose);

            let n = frame.index.len();
            let mut open = dense(&quote.open, n);
            let mut high = dense(&quote.high, n);
            let mut low = dense(&quote.low, n);
            let mut close = dense(&quote.close, n);
            let volume = dense(&quote.volume, n);

            if request.adjust {
                if let Some(adj) = adj_closes {
                    let adj = dense(&adj, n);
                    for i in 0..n {
                        let factor = adj[i] / close[i];
                        open[i] *= factor;
                        high[i] *= factor;
                        low[i] *= factor;
                        close[i] = adj[i];
                    }
                }
            }

            for (field, values) in [
                ("Open", open),
                ("High", high),
                ("Low", low),
                ("Close", close),
                ("Volume", volume),
            ] {
                frame.push_column(ColumnHeader::nested([field, result_symbol.as_str()]), values);
            }
        }

        Ok(frame)
    }

    /// Execute the HTTP request with retry and circuit breaker logic.
    fn fetch_with_retry(&self, symbol: &str, request: &FetchRequest) -> Result<RawFrame, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let url = Self::chart_url(symbol, request);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::FORBIDDEN {
                        // IP ban: immediately trip the circuit breaker
                        self.circuit_breaker.trip();
                        return Err(DataError::CircuitBreakerTripped);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        self.circuit_breaker.record_failure();
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(DataError::AuthenticationRequired(
                            "Yahoo Finance requires authentication".into(),
                        ));
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(DataError::SymbolNotFound {
                            symbol: symbol.to_string(),
                        });
                    }

                    if !status.is_success() {
                        self.circuit_breaker.record_failure();
                        last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                        continue;
                    }

                    let chart: ChartResponse = resp.json().map_err(|e| {
                        DataError::ResponseFormatChanged(format!(
                            "failed to parse response for {symbol}: {e}"
                        ))
                    })?;

                    let frame = Self::parse_response(symbol, request, chart)?;
                    self.circuit_breaker.record_success();
                    return Ok(frame);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        self.circuit_breaker.record_failure();
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn source(&self) -> DataSource {
        DataSource::YahooFinance
    }

    fn fetch(&self, symbol: &str, request: &FetchRequest) -> Result<RawFrame, DataError> {
        self.fetch_with_retry(symbol, request)
    }

    fn reset(&self) {
        self.circuit_breaker.reset();
    }
}

/// Unix seconds plus exchange offset, as a naive wall-clock timestamp.
fn local_timestamp(ts: i64, gmtoffset: i64) -> Result<NaiveDateTime, DataError> {
    chrono::DateTime::from_timestamp(ts + gmtoffset, 0)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))
}

/// Null cells and short arrays become NaN.
fn dense(values: &[Option<f64>], n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| values.get(i).copied().flatten().unwrap_or(f64::NAN))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::normalize::normalize;
    use chrono::{NaiveDate, Timelike};

    fn parse(json: &str) -> Result<RawFrame, DataError> {
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        YahooProvider::parse_response("RELIANCE.NS", &FetchRequest::default(), resp)
    }

    const ONE_RESULT: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "RELIANCE.NS", "gmtoffset": 19800},
                "timestamp": [1714966200, 1714966500, 1714966800],
                "indicators": {
                    "quote": [{
                        "open": [2900.0, 2901.5, null],
                        "high": [2905.0, 2903.0, null],
                        "low": [2898.0, 2899.0, null],
                        "close": [2901.5, 2902.0, null],
                        "volume": [12000, 9000, null]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn chart_url_uses_intraday_parameters() {
        let url = YahooProvider::chart_url("TCS.NS", &FetchRequest::default());
        assert!(url.contains("/TCS.NS?"));
        assert!(url.contains("range=5d"));
        assert!(url.contains("interval=5m"));
        assert!(url.contains("includeAdjustedClose=false"));
    }

    #[test]
    fn parses_into_nested_columns_in_exchange_time() {
        let frame = parse(ONE_RESULT).unwrap();
        assert!(frame.is_multi_level());
        assert_eq!(frame.index.len(), 3);
        // 1714966200 = 2024-05-06 03:30 UTC = 09:00 IST
        assert_eq!(
            frame.index[0],
            NaiveDate::from_ymd_opt(2024, 5, 6)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        );
        assert_eq!(frame.index[1].minute(), 5);
    }

    #[test]
    fn null_rows_are_dropped_by_normalization() {
        let bars = normalize(parse(ONE_RESULT).unwrap(), "RELIANCE.NS").unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 2902.0);
        assert_eq!(bars[0].volume, 12000.0);
    }

    #[test]
    fn missing_timestamps_mean_no_trading() {
        let json = r#"{"chart":{"result":[{"meta":{"symbol":"X.NS","gmtoffset":19800},
            "indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse(json).unwrap().is_empty());
    }

    #[test]
    fn not_found_error_maps_to_symbol_not_found() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(matches!(
            parse(json).unwrap_err(),
            DataError::SymbolNotFound { .. }
        ));
    }

    #[test]
    fn other_error_maps_to_format_changed() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#;
        assert!(matches!(
            parse(json).unwrap_err(),
            DataError::ResponseFormatChanged(_)
        ));
    }

    #[test]
    fn one_offset_covers_the_whole_window() {
        // Two sessions a week apart, both 09:15 IST
        let first = local_timestamp(1_714_967_100, 19_800).unwrap();
        let later = local_timestamp(1_715_571_900, 19_800).unwrap();
        assert_eq!(first.time(), later.time());
        assert_eq!((first.hour(), first.minute()), (9, 15));
    }

    #[test]
    fn reset_reopens_a_tripped_breaker() {
        let breaker = Arc::new(CircuitBreaker::default_provider());
        let provider = YahooProvider::new(Arc::clone(&breaker), Duration::from_secs(1)).unwrap();
        breaker.trip();
        assert!(!breaker.is_allowed());

        provider.reset();
        assert!(breaker.is_allowed());
    }
}
