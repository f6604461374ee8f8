//! Market data: providers, normalization, instrument universe

pub mod circuit_breaker;
pub mod csv_import;
pub mod normalize;
pub mod provider;
pub mod universe;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvProvider;
pub use normalize::{normalize, ColumnHeader, RawColumn, RawFrame, OHLCV_FIELDS};
pub use provider::{DataError, DataProvider, DataSource, FetchRequest};
pub use universe::{Universe, UniverseError};
pub use yahoo::YahooProvider;
