//! Per-cycle memoization of fetch-and-enrich results.
//!
//! Keyed by symbol plus the fetch request, so a change of window or interval
//! never serves stale bars. "No data" outcomes are cached as well: within one
//! cycle a failing symbol is not retried.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use niftyscan_core::data::FetchRequest;
use niftyscan_core::domain::EnrichedBar;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub symbol: String,
    pub request: FetchRequest,
}

impl FetchKey {
    pub fn new(symbol: impl Into<String>, request: FetchRequest) -> Self {
        Self {
            symbol: symbol.into(),
            request,
        }
    }
}

/// Result of fetching and enriching one instrument.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Non-empty enriched series.
    Series(Arc<[EnrichedBar]>),
    /// Nothing usable; the reason is kept for logs and the status bar.
    NoData(String),
}

impl FetchOutcome {
    pub fn is_data(&self) -> bool {
        matches!(self, FetchOutcome::Series(_))
    }
}

/// Memoized fetch results shared by the workers of one cycle.
///
/// The lock is never held while a fetch runs.
#[derive(Debug, Default)]
pub struct FetchCache {
    entries: Mutex<HashMap<FetchKey, FetchOutcome>>,
}

impl FetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<FetchKey, FetchOutcome>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &FetchKey) -> Option<FetchOutcome> {
        self.lock().get(key).cloned()
    }

    /// Return the cached outcome for `key`, or run `fetch` and remember its result.
    ///
    /// If two callers race on the same key, the first stored outcome wins and
    /// both receive it.
    pub fn get_or_fetch<F>(&self, key: FetchKey, fetch: F) -> FetchOutcome
    where
        F: FnOnce() -> FetchOutcome,
    {
        if let Some(hit) = self.get(&key) {
            tracing::debug!(symbol = %key.symbol, "fetch cache hit");
            return hit;
        }

        let outcome = fetch();
        self.lock().entry(key).or_insert(outcome).clone()
    }

    /// Forget everything. Called at the start of each refresh.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
