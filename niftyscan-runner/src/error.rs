use thiserror::Error;

use niftyscan_core::data::{DataError, UniverseError};

use crate::config::ConfigError;

/// Errors that stop a screening cycle.
///
/// A single instrument failing to fetch is not an error: it is dropped and
/// reported in the cycle report.
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error("no data fetched for any of {attempted} instruments")]
    NoDataFetched { attempted: usize },

    #[error("data provider setup failed: {0}")]
    Provider(#[from] DataError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
