//! End-to-end screening cycles against an in-memory provider.

use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use niftyscan_core::data::{
    CircuitBreaker, ColumnHeader, DataError, DataProvider, DataSource, FetchRequest, RawFrame,
};
use niftyscan_runner::{FetchOutcome, ScreenError, Screener, ScreenerConfig};

/// Serves synthetic frames for known symbols; unknown symbols get an empty frame.
struct MockProvider {
    frames: HashMap<String, RawFrame>,
    failing: Vec<String>,
    calls: Arc<AtomicUsize>,
}

impl DataProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch(&self, symbol: &str, _request: &FetchRequest) -> Result<RawFrame, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.iter().any(|s| s == symbol) {
            return Err(DataError::NetworkUnreachable("connection reset".into()));
        }
        Ok(self.frames.get(symbol).cloned().unwrap_or_default())
    }
}

/// Mock provider behind a circuit breaker, failing fast while it is open.
struct GuardedProvider {
    inner: MockProvider,
    breaker: Arc<CircuitBreaker>,
}

impl DataProvider for GuardedProvider {
    fn name(&self) -> &str {
        "guarded"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch(&self, symbol: &str, request: &FetchRequest) -> Result<RawFrame, DataError> {
        if !self.breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }
        self.inner.fetch(symbol, request)
    }

    fn reset(&self) {
        self.breaker.reset();
    }
}

/// Two sessions of 5-minute bars with nested `[field, symbol]` headers.
fn session_frame(symbol: &str, seed: f64) -> RawFrame {
    let mut index = Vec::new();
    let mut closes = Vec::new();
    for day in 0..2u32 {
        let start = NaiveDate::from_ymd_opt(2024, 5, 6 + day)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap();
        for i in 0..75 {
            index.push(start + chrono::Duration::minutes(5 * i as i64));
            let t = (day * 75 + i) as f64;
            closes.push(800.0 + (t * 0.11 + seed).sin() * 9.0 + t * 0.2);
        }
    }
    let opens: Vec<f64> = closes.iter().map(|c| c - 0.4).collect();
    let highs: Vec<f64> = closes.iter().map(|c| c + 1.2).collect();
    let lows: Vec<f64> = opens.iter().map(|o| o - 1.2).collect();

    let mut frame = RawFrame::new(index);
    frame.push_column(ColumnHeader::nested(["Close", symbol]), closes);
    frame.push_column(ColumnHeader::nested(["High", symbol]), highs);
    frame.push_column(ColumnHeader::nested(["Low", symbol]), lows);
    frame.push_column(ColumnHeader::nested(["Open", symbol]), opens);
    frame.push_column(ColumnHeader::nested(["Volume", symbol]), vec![1000.0; 150]);
    frame
}

fn mock(with_data: &[&str], failing: &[&str]) -> (MockProvider, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let frames = with_data
        .iter()
        .enumerate()
        .map(|(i, s)| (s.to_string(), session_frame(s, i as f64)))
        .collect();
    let provider = MockProvider {
        frames,
        failing: failing.iter().map(|s| s.to_string()).collect(),
        calls: Arc::clone(&calls),
    };
    (provider, calls)
}

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn empty_instruments_are_dropped_not_fatal() {
    let (provider, calls) = mock(&["A.NS", "C.NS", "E.NS"], &["D.NS"]);
    let screener = Screener::new(Box::new(provider), ScreenerConfig::default());
    let universe = symbols(&["A.NS", "B.NS", "C.NS", "D.NS", "E.NS"]);

    let report = screener.run_screening_cycle(&universe).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert_eq!(report.attempted, 5);
    assert_eq!(report.fetched(), 3);
    let dropped: Vec<&str> = report.dropped.iter().map(|d| d.symbol.as_str()).collect();
    assert_eq!(dropped, ["B.NS", "D.NS"]);
    assert_eq!(report.table.instrument_count(), 3);
    let cutoff = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
    let per_instrument = session_frame("A.NS", 0.0)
        .index
        .iter()
        .filter(|ts| ts.time() >= cutoff)
        .count();
    assert_eq!(per_instrument, 2 * 66);
    assert_eq!(report.table.len(), 3 * per_instrument);

    let mut order: Vec<&str> = report.table.rows().iter().map(|r| r.symbol()).collect();
    order.dedup();
    assert_eq!(order, ["A.NS", "C.NS", "E.NS"]);
}

#[test]
fn cache_prevents_refetch_until_cleared() {
    let (provider, calls) = mock(&["A.NS"], &[]);
    let screener = Screener::new(Box::new(provider), ScreenerConfig::default());
    let universe = symbols(&["A.NS", "B.NS"]);

    screener.run_screening_cycle(&universe).unwrap();
    screener.run_screening_cycle(&universe).unwrap();
    assert!(matches!(screener.fetch_and_enrich("A.NS"), FetchOutcome::Series(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    screener.cache().clear();
    screener.run_screening_cycle(&universe).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn total_failure_is_no_data_fetched() {
    let (provider, _calls) = mock(&[], &["A.NS"]);
    let screener = Screener::new(Box::new(provider), ScreenerConfig::default());
    let err = screener
        .run_screening_cycle(&symbols(&["A.NS", "B.NS"]))
        .unwrap_err();
    assert!(matches!(err, ScreenError::NoDataFetched { attempted: 2 }));
}

#[test]
fn parallel_cycle_matches_sequential() {
    let names = ["A.NS", "B.NS", "C.NS", "D.NS", "E.NS", "F.NS"];
    let universe = symbols(&names);

    let (sequential_provider, _) = mock(&names, &[]);
    let sequential = Screener::new(Box::new(sequential_provider), ScreenerConfig::default())
        .run_screening_cycle(&universe)
        .unwrap();

    let mut config = ScreenerConfig::default();
    config.fetch.parallel = true;
    let (parallel_provider, _) = mock(&names, &[]);
    let parallel = Screener::new(Box::new(parallel_provider), config)
        .run_screening_cycle(&universe)
        .unwrap();

    assert_eq!(sequential.table, parallel.table);
    assert_eq!(sequential.views(), parallel.views());
}

#[test]
fn missing_stock_column_halts_before_any_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("nifty_stocks.csv");
    fs::write(&list, "Symbol\nA.NS\nB.NS\n").unwrap();

    let mut config = ScreenerConfig::default();
    config.universe.path = list;
    let (provider, calls) = mock(&["A.NS"], &[]);
    let screener = Screener::new(Box::new(provider), config);

    let err = screener.refresh().unwrap_err();
    assert!(matches!(err, ScreenError::Universe(_)));
    assert!(err.to_string().contains("Stock"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn refresh_reloads_list_and_refetches() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("nifty_stocks.csv");
    fs::write(&list, "Stock,Sector\nA.NS,Energy\nA.NS,Energy\nB.NS,IT\n").unwrap();

    let mut config = ScreenerConfig::default();
    config.universe.path = list.clone();
    let (provider, calls) = mock(&["A.NS", "B.NS"], &[]);
    let screener = Screener::new(Box::new(provider), config);

    let first = screener.refresh().unwrap();
    assert_eq!(first.attempted, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    fs::write(&list, "Stock\nB.NS\n").unwrap();
    let second = screener.refresh().unwrap();
    assert_eq!(second.attempted, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(second.table.rows().iter().all(|r| r.symbol() == "B.NS"));
}

#[test]
fn refresh_recovers_from_a_tripped_breaker() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("nifty_stocks.csv");
    fs::write(&list, "Stock\nA.NS\nB.NS\n").unwrap();

    let mut config = ScreenerConfig::default();
    config.universe.path = list;
    let (inner, calls) = mock(&["A.NS", "B.NS"], &[]);
    let breaker = Arc::new(CircuitBreaker::default_provider());
    let provider = GuardedProvider {
        inner,
        breaker: Arc::clone(&breaker),
    };
    let screener = Screener::new(Box::new(provider), config);

    for _ in 0..3 {
        breaker.record_failure();
    }
    let err = screener
        .run_screening_cycle(&symbols(&["A.NS", "B.NS"]))
        .unwrap_err();
    assert!(matches!(err, ScreenError::NoDataFetched { attempted: 2 }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let report = screener.refresh().unwrap();
    assert_eq!(report.fetched(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(breaker.is_allowed());
}
