//! Screening cycle: instrument list → fetch-and-enrich → composed table.
//!
//! The screener owns its data provider and the fetch cache. Nothing is
//! global: two screeners never share cached bars, and a refresh is simply
//! "clear the cache, reload the list, run a cycle".

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};
use rayon::prelude::*;

use niftyscan_core::data::{
    normalize, CircuitBreaker, CsvProvider, DataProvider, DataSource, Universe, YahooProvider,
};
use niftyscan_core::indicators::attach_indicators;
use niftyscan_core::signals::{compose, ComposedTable, SignalView};

use crate::config::ScreenerConfig;
use crate::error::ScreenError;
use crate::fetch_cache::{FetchCache, FetchKey, FetchOutcome};
use crate::progress::{CycleProgress, NoProgress};

/// An instrument that contributed no rows, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedInstrument {
    pub symbol: String,
    pub reason: String,
}

/// Everything one refresh cycle produced.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub table: ComposedTable,
    pub attempted: usize,
    pub dropped: Vec<DroppedInstrument>,
    pub source: DataSource,
    pub completed_at: NaiveDateTime,
    pub elapsed: Duration,
}

impl CycleReport {
    pub fn fetched(&self) -> usize {
        self.attempted - self.dropped.len()
    }

    /// The CALL and PUT views, in that order.
    pub fn views(&self) -> [SignalView; 2] {
        self.table.views(self.source.label())
    }
}

pub struct Screener {
    provider: Box<dyn DataProvider>,
    cache: FetchCache,
    config: ScreenerConfig,
}

impl Screener {
    pub fn new(provider: Box<dyn DataProvider>, config: ScreenerConfig) -> Self {
        Self {
            provider,
            cache: FetchCache::new(),
            config,
        }
    }

    /// Build the provider the configuration asks for: CSV import when a data
    /// directory is set, Yahoo otherwise.
    pub fn from_config(config: ScreenerConfig) -> Result<Self, ScreenError> {
        config.validate()?;
        let provider: Box<dyn DataProvider> = match &config.fetch.data_dir {
            Some(dir) => Box::new(CsvProvider::new(dir)),
            None => {
                let breaker = Arc::new(CircuitBreaker::default_provider());
                Box::new(
                    YahooProvider::new(breaker, config.fetch.timeout())?
                        .with_retries(config.fetch.max_retries),
                )
            }
        };
        tracing::info!(provider = provider.name(), "screener ready");
        Ok(Self::new(provider, config))
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    pub fn source(&self) -> DataSource {
        self.provider.source()
    }

    /// Read the instrument list named by the configuration.
    pub fn load_universe(&self) -> Result<Universe, ScreenError> {
        let universe = &self.config.universe;
        let loaded = Universe::from_file(&universe.path, &universe.column)?;
        tracing::info!(
            path = %universe.path.display(),
            instruments = loaded.len(),
            "instrument list loaded"
        );
        Ok(loaded)
    }

    /// Fetch one instrument, normalize it and attach indicators, going
    /// through the cycle cache. Failures and empty results become `NoData`.
    pub fn fetch_and_enrich(&self, symbol: &str) -> FetchOutcome {
        let request = self.config.fetch.request();
        self.cache.get_or_fetch(FetchKey::new(symbol, request), || {
            let bars = self
                .provider
                .fetch(symbol, &request)
                .and_then(|frame| normalize(frame, symbol));
            match bars {
                Ok(bars) if bars.is_empty() => {
                    FetchOutcome::NoData("no bars in the requested window".into())
                }
                Ok(bars) => FetchOutcome::Series(attach_indicators(bars).into()),
                Err(e) => FetchOutcome::NoData(e.to_string()),
            }
        })
    }

    pub fn run_screening_cycle(&self, symbols: &[String]) -> Result<CycleReport, ScreenError> {
        self.run_screening_cycle_with(symbols, &NoProgress)
    }

    /// Run one cycle over `symbols`.
    ///
    /// Instruments that yield no data are dropped and logged. The cycle fails
    /// only when every instrument was dropped.
    pub fn run_screening_cycle_with(
        &self,
        symbols: &[String],
        progress: &dyn CycleProgress,
    ) -> Result<CycleReport, ScreenError> {
        let started = Instant::now();
        let total = symbols.len();
        tracing::info!(instruments = total, parallel = self.config.fetch.parallel, "screening cycle started");

        let fetch_one = |(index, symbol): (usize, &String)| {
            progress.on_start(symbol, index, total);
            let outcome = self.fetch_and_enrich(symbol);
            progress.on_complete(symbol, index, total, &outcome);
            outcome
        };

        let outcomes: Vec<FetchOutcome> = if self.config.fetch.parallel {
            symbols.par_iter().enumerate().map(fetch_one).collect()
        } else {
            symbols.iter().enumerate().map(fetch_one).collect()
        };

        let mut series = Vec::with_capacity(total);
        let mut dropped = Vec::new();
        for (symbol, outcome) in symbols.iter().zip(outcomes) {
            match outcome {
                FetchOutcome::Series(bars) => series.push(bars.to_vec()),
                FetchOutcome::NoData(reason) => {
                    tracing::warn!(symbol = %symbol, %reason, "instrument dropped");
                    dropped.push(DroppedInstrument {
                        symbol: symbol.clone(),
                        reason,
                    });
                }
            }
        }
        progress.on_cycle_complete(series.len(), dropped.len(), total);

        if series.is_empty() {
            return Err(ScreenError::NoDataFetched { attempted: total });
        }

        let table = compose(series, &self.config.rules, self.config.session.cutoff);
        let report = CycleReport {
            table,
            attempted: total,
            dropped,
            source: self.source(),
            completed_at: Local::now().naive_local(),
            elapsed: started.elapsed(),
        };

        tracing::info!(
            rows = report.table.len(),
            fetched = report.fetched(),
            dropped = report.dropped.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "screening cycle complete"
        );
        Ok(report)
    }

    pub fn refresh(&self) -> Result<CycleReport, ScreenError> {
        self.refresh_with(&NoProgress)
    }

    /// Clear the cache, reset the provider, reload the instrument list and
    /// run a full cycle.
    ///
    /// A missing or malformed instrument list fails before any fetch.
    pub fn refresh_with(&self, progress: &dyn CycleProgress) -> Result<CycleReport, ScreenError> {
        self.cache.clear();
        self.provider.reset();
        tracing::debug!(provider = self.provider.name(), "cache cleared and provider reset");
        let universe = self.load_universe()?;
        self.run_screening_cycle_with(universe.symbols(), progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use niftyscan_core::data::{DataError, FetchRequest, RawFrame};

    struct FailingProvider;

    impl DataProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }
        fn source(&self) -> DataSource {
            DataSource::Synthetic
        }
        fn fetch(&self, symbol: &str, _request: &FetchRequest) -> Result<RawFrame, DataError> {
            Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
        }
    }

    #[test]
    fn failure_is_cached_as_no_data() {
        let screener = Screener::new(Box::new(FailingProvider), ScreenerConfig::default());
        let outcome = screener.fetch_and_enrich("X.NS");
        assert!(!outcome.is_data());
        assert_eq!(screener.cache().len(), 1);
    }

    #[test]
    fn empty_symbol_list_has_no_data() {
        let screener = Screener::new(Box::new(FailingProvider), ScreenerConfig::default());
        let err = screener.run_screening_cycle(&[]).unwrap_err();
        assert!(matches!(err, ScreenError::NoDataFetched { attempted: 0 }));
    }

    #[test]
    fn csv_data_dir_selects_csv_provider() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ScreenerConfig::default();
        config.fetch.data_dir = Some(dir.path().to_path_buf());
        let screener = Screener::from_config(config).unwrap();
        assert_eq!(screener.source(), DataSource::CsvImport);
    }
}
