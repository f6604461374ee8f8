//! Progress callbacks for a screening cycle.

use crate::fetch_cache::FetchOutcome;

/// Receives per-instrument progress during a cycle.
///
/// Callbacks may arrive from rayon worker threads when fetching in parallel,
/// so `index` order is not guaranteed.
pub trait CycleProgress: Send + Sync {
    /// Called before an instrument is fetched (or served from the cache).
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when an instrument's outcome is known.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, outcome: &FetchOutcome);

    /// Called once every instrument has been attempted.
    fn on_cycle_complete(&self, fetched: usize, dropped: usize, total: usize);
}

/// Ignores all progress.
pub struct NoProgress;

impl CycleProgress for NoProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}
    fn on_complete(&self, _symbol: &str, _index: usize, _total: usize, _outcome: &FetchOutcome) {}
    fn on_cycle_complete(&self, _fetched: usize, _dropped: usize, _total: usize) {}
}

/// Reports progress through `tracing`.
pub struct LogProgress;

impl CycleProgress for LogProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        tracing::debug!("[{}/{}] fetching {symbol}", index + 1, total);
    }

    fn on_complete(&self, symbol: &str, _index: usize, _total: usize, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Series(bars) => tracing::debug!(symbol, bars = bars.len(), "ok"),
            FetchOutcome::NoData(reason) => tracing::debug!(symbol, %reason, "no data"),
        }
    }

    fn on_cycle_complete(&self, fetched: usize, dropped: usize, total: usize) {
        tracing::info!(fetched, dropped, total, "fetch phase complete");
    }
}
