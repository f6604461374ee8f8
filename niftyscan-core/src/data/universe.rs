//! Instrument universe: the list of symbols to screen.
//!
//! Loaded from a delimited file with a required `Stock` column. Values are
//! deduplicated in order of first appearance; blank cells are skipped.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

/// Column that holds the instrument identifiers unless configured otherwise.
pub const DEFAULT_COLUMN: &str = "Stock";

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read instrument list {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse instrument list: {0}")]
    Csv(#[from] csv::Error),

    #[error("instrument list must contain column: {column}")]
    MissingColumn { column: String },
}

/// Ordered, duplicate-free instrument identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Universe {
    symbols: Vec<String>,
}

impl Universe {
    /// Build from an iterator, keeping the first occurrence of each symbol.
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let symbols = symbols
            .into_iter()
            .map(Into::into)
            .map(|s: String| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert(s.clone()))
            .collect();
        Self { symbols }
    }

    /// Load a universe from a CSV file.
    pub fn from_file(path: &Path, column: &str) -> Result<Self, UniverseError> {
        let file = std::fs::File::open(path).map_err(|source| UniverseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file, column)
    }

    /// Parse a universe from any CSV source.
    pub fn from_reader<R: Read>(reader: R, column: &str) -> Result<Self, UniverseError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let position = reader
            .headers()?
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| UniverseError::MissingColumn {
                column: column.to_string(),
            })?;

        let mut cells = Vec::new();
        for record in reader.records() {
            let record = record?;
            if let Some(cell) = record.get(position) {
                cells.push(cell.to_string());
            }
        }

        Ok(Self::from_symbols(cells))
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
