//! CSV import provider: offline bars from `{data_dir}/{symbol}.csv`.
//!
//! Accepts both layouts commonly written by Python export tools:
//!
//! ```text
//! Datetime,Open,High,Low,Close,Volume                 (single-level)
//!
//! Price,Close,High,Low,Open,Volume                    (multi-level)
//! Ticker,TCS.NS,TCS.NS,TCS.NS,TCS.NS,TCS.NS
//! Datetime,,,,,
//! ```
//!
//! Every leading row whose first cell is not a timestamp is a header row;
//! header rows with no labels after the first cell (the index-name row) add
//! no level. Cells that do not parse as numbers are read as NaN.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime};

use super::normalize::{ColumnHeader, RawFrame};
use super::provider::{DataError, DataProvider, DataSource, FetchRequest};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"];

/// Reads pre-exported bar files instead of calling a remote API.
///
/// The request window is not applied: the file is the window.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    data_dir: PathBuf,
}

impl CsvProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn symbol_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{symbol}.csv"))
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn source(&self) -> DataSource {
        DataSource::CsvImport
    }

    fn fetch(&self, symbol: &str, _request: &FetchRequest) -> Result<RawFrame, DataError> {
        let path = self.symbol_path(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| DataError::CsvImport(format!("read {}: {e}", path.display())))?;
        parse_frame(&content)
    }
}

/// Parse CSV text into a raw frame, keeping every header level.
pub fn parse_frame(content: &str) -> Result<RawFrame, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut header_rows: Vec<Vec<String>> = Vec::new();
    let mut index = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| DataError::CsvImport(e.to_string()))?;
        let first = record.get(0).unwrap_or("");

        match parse_timestamp(first) {
            Some(ts) => {
                index.push(ts);
                rows.push(record.iter().skip(1).map(parse_number).collect());
            }
            None if index.is_empty() => {
                let labels: Vec<String> = record.iter().skip(1).map(str::to_string).collect();
                if labels.iter().any(|l| !l.is_empty()) {
                    header_rows.push(labels);
                }
            }
            None => {
                return Err(DataError::CsvImport(format!(
                    "unparseable timestamp '{first}' after data rows"
                )))
            }
        }
    }

    if header_rows.is_empty() {
        return Err(DataError::CsvImport("no header row".into()));
    }

    let width = header_rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut frame = RawFrame::new(index);
    for col in 0..width {
        let levels: Vec<String> = header_rows
            .iter()
            .filter_map(|row| row.get(col))
            .filter(|label| !label.is_empty())
            .cloned()
            .collect();
        if levels.is_empty() {
            continue;
        }
        let values = rows
            .iter()
            .map(|row| row.get(col).copied().unwrap_or(f64::NAN))
            .collect();
        frame.push_column(ColumnHeader::nested(levels), values);
    }

    Ok(frame)
}

/// Timestamps with a UTC offset keep their local wall clock.
fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    if cell.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(cell, fmt) {
            return Some(dt.naive_local());
        }
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(cell, fmt).ok())
}

fn parse_number(cell: &str) -> f64 {
    cell.parse::<f64>().unwrap_or(f64::NAN)
}
