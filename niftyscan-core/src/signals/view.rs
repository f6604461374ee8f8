//! Read-only presentation views over a composed table.

use std::cmp::Ordering;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::{Side, SignalRow};

/// Fixed projection of one active row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRow {
    pub symbol: String,
    pub bb60: Option<f64>,
    pub bb105: Option<f64>,
    pub bb150: Option<f64>,
    pub willr28: Option<f64>,
    pub rsi20: Option<f64>,
    pub plus_di6: Option<f64>,
    pub minus_di6: Option<f64>,
    pub plus_di20: Option<f64>,
    pub minus_di20: Option<f64>,
    pub entry_time: Option<NaiveDateTime>,
    pub duration_minutes: Option<f64>,
}

impl From<&SignalRow> for ViewRow {
    fn from(row: &SignalRow) -> Self {
        let ind = &row.indicators;
        Self {
            symbol: row.bar.symbol.clone(),
            bb60: ind.bb60,
            bb105: ind.bb105,
            bb150: ind.bb150,
            willr28: ind.willr28,
            rsi20: ind.rsi20,
            plus_di6: ind.plus_di6,
            minus_di6: ind.minus_di6,
            plus_di20: ind.plus_di20,
            minus_di20: ind.minus_di20,
            entry_time: row.entry_time,
            duration_minutes: row.duration_minutes,
        }
    }
}

impl ViewRow {
    /// Display cells in `VIEW_COLUMNS` order. Missing values render as `-`.
    pub fn cells(&self) -> [String; 12] {
        [
            self.symbol.clone(),
            number(self.bb60),
            number(self.bb105),
            number(self.bb150),
            number(self.willr28),
            number(self.rsi20),
            number(self.plus_di6),
            number(self.minus_di6),
            number(self.plus_di20),
            number(self.minus_di20),
            self.entry_time
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".into()),
            self.duration_minutes
                .map(|d| format!("{d:.0}"))
                .unwrap_or_else(|| "-".into()),
        ]
    }
}

fn number(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into())
}

/// Column headings in projection order.
pub const VIEW_COLUMNS: [&str; 12] = [
    "Stock",
    "BB60",
    "BB105",
    "BB150",
    "WILLR28",
    "RSI20",
    "+DI6",
    "-DI6",
    "+DI20",
    "-DI20",
    "Entry_Time",
    "Duration_Min",
];

/// Active rows for one side, ascending by BB60.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalView {
    pub side: Side,
    pub title: String,
    pub caption: String,
    pub rows: Vec<ViewRow>,
}

impl SignalView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Select the rows active for `side` and sort them by BB60.
///
/// The sort is stable, so ties keep table order. Rows without BB60 sort last.
pub fn active_view(rows: &[SignalRow], side: Side, caption: &str) -> SignalView {
    let mut selected: Vec<ViewRow> = rows
        .iter()
        .filter(|row| row.flags.is_active(side))
        .map(ViewRow::from)
        .collect();
    selected.sort_by(|a, b| missing_last(a.bb60, b.bb60));

    SignalView {
        side,
        title: side.label().to_string(),
        caption: caption.to_string(),
        rows: selected,
    }
}

/// Caption shown under both views.
pub fn caption(source: &str, cutoff: NaiveTime) -> String {
    format!(
        "Data: {source} | From {} | Multiple entries allowed",
        cutoff.format("%H:%M")
    )
}

fn missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
