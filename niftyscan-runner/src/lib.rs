//! niftyscan runner: screening cycle orchestration.
//!
//! This crate builds on `niftyscan-core` to provide:
//! - TOML configuration with validated defaults
//! - A per-cycle fetch cache keyed by symbol and request
//! - The screener: fetch-and-enrich per instrument, composition, refresh
//! - Progress callbacks and logging setup shared by the CLI and TUI

pub mod config;
pub mod error;
pub mod fetch_cache;
pub mod logging;
pub mod progress;
pub mod screener;

pub use config::{ConfigError, FetchConfig, ScreenerConfig, SessionConfig, UniverseConfig};
pub use error::ScreenError;
pub use fetch_cache::{FetchCache, FetchKey, FetchOutcome};
pub use logging::{init_file_logging, init_logging};
pub use progress::{CycleProgress, LogProgress, NoProgress};
pub use screener::{CycleReport, DroppedInstrument, Screener};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn screener_is_send_sync() {
        assert_send::<Screener>();
        assert_sync::<Screener>();
    }

    #[test]
    fn cycle_report_is_send_sync() {
        assert_send::<CycleReport>();
        assert_sync::<CycleReport>();
    }

    #[test]
    fn config_is_send_sync() {
        assert_send::<ScreenerConfig>();
        assert_sync::<ScreenerConfig>();
    }

    #[test]
    fn screen_error_is_send_sync() {
        assert_send::<ScreenError>();
        assert_sync::<ScreenError>();
    }
}
