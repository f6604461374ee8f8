//! Raw provider tables and their normalization into bar series.
//!
//! Providers hand back a [`RawFrame`]: a timestamp index plus numeric columns
//! whose headers may carry more than one level (field name first, then for
//! example the ticker). Before any indicator is computed the frame is
//! flattened to the five OHLCV fields and turned into a strictly increasing
//! `Vec<Bar>`.

use chrono::NaiveDateTime;

use super::provider::DataError;
use crate::domain::Bar;

/// Field names every frame must provide, in bar order.
pub const OHLCV_FIELDS: [&str; 5] = ["Open", "High", "Low", "Close", "Volume"];

/// Column header with one or more levels. Level 0 is the field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    levels: Vec<String>,
}

impl ColumnHeader {
    pub fn flat(field: impl Into<String>) -> Self {
        Self {
            levels: vec![field.into()],
        }
    }

    pub fn nested<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            levels: levels.into_iter().map(Into::into).collect(),
        }
    }

    /// The field name (first level), empty if the header has no levels.
    pub fn field(&self) -> &str {
        self.levels.first().map(String::as_str).unwrap_or("")
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// True if any level below the field names `symbol`.
    pub fn mentions(&self, symbol: &str) -> bool {
        self.levels
            .iter()
            .skip(1)
            .any(|level| level.eq_ignore_ascii_case(symbol))
    }
}

/// One numeric column. Unparseable cells are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub header: ColumnHeader,
    pub values: Vec<f64>,
}

/// A provider table before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    pub index: Vec<NaiveDateTime>,
    pub columns: Vec<RawColumn>,
}

impl RawFrame {
    pub fn new(index: Vec<NaiveDateTime>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    pub fn push_column(&mut self, header: ColumnHeader, values: Vec<f64>) {
        self.columns.push(RawColumn { header, values });
    }

    /// No rows at all.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn is_multi_level(&self) -> bool {
        self.columns.iter().any(|c| c.header.depth() > 1)
    }
}

/// Flatten a frame to single-level OHLCV fields and build the bar series.
///
/// When several columns share a field name, the one whose header mentions
/// `symbol` wins; otherwise the first one does. Rows where every field is
/// NaN are skipped. The result is sorted by timestamp and keeps the first
/// row of any duplicate timestamp.
pub fn normalize(frame: RawFrame, symbol: &str) -> Result<Vec<Bar>, DataError> {
    if frame.is_empty() {
        return Ok(Vec::new());
    }

    if frame.is_multi_level() {
        tracing::debug!(symbol, "flattening multi-level column headers");
    }

    let n = frame.index.len();
    let mut selected: Vec<&[f64]> = Vec::with_capacity(OHLCV_FIELDS.len());
    for field in OHLCV_FIELDS {
        let column = select_column(&frame, field, symbol).ok_or_else(|| {
            DataError::ResponseFormatChanged(format!("missing column '{field}' for {symbol}"))
        })?;
        if column.values.len() != n {
            return Err(DataError::ResponseFormatChanged(format!(
                "column '{field}' has {} values for {n} timestamps",
                column.values.len()
            )));
        }
        selected.push(&column.values);
    }

    let mut bars = Vec::with_capacity(n);
    for (i, &timestamp) in frame.index.iter().enumerate() {
        let (open, high, low, close, volume) = (
            selected[0][i],
            selected[1][i],
            selected[2][i],
            selected[3][i],
            selected[4][i],
        );

        // Skip rows where all OHLCV are missing (halts, placeholder rows)
        if open.is_nan() && high.is_nan() && low.is_nan() && close.is_nan() && volume.is_nan() {
            continue;
        }

        bars.push(Bar {
            symbol: symbol.to_string(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);
    Ok(bars)
}

fn select_column<'a>(frame: &'a RawFrame, field: &str, symbol: &str) -> Option<&'a RawColumn> {
    let mut candidates = frame
        .columns
        .iter()
        .filter(|c| c.header.field().eq_ignore_ascii_case(field));
    let first = candidates.next()?;
    if first.header.mentions(symbol) {
        return Some(first);
    }
    candidates
        .find(|c| c.header.mentions(symbol))
        .or(Some(first))
}
