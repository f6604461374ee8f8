//! Signal composition: merge, time filter, flags, entry duration.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::rules::SignalRules;
use super::view::{active_view, caption, SignalView};
use crate::domain::{EnrichedBar, Side, SignalRow};

/// Default start of the screening session (exchange-local).
pub fn default_cutoff() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default()
}

/// The rows produced by one refresh cycle, in universe order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComposedTable {
    rows: Vec<SignalRow>,
    cutoff: NaiveTime,
}

impl ComposedTable {
    pub fn rows(&self) -> &[SignalRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cutoff(&self) -> NaiveTime {
        self.cutoff
    }

    /// Number of distinct instruments with at least one row.
    pub fn instrument_count(&self) -> usize {
        self.rows
            .iter()
            .map(SignalRow::symbol)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn view(&self, side: Side, source: &str) -> SignalView {
        active_view(&self.rows, side, &caption(source, self.cutoff))
    }

    pub fn views(&self, source: &str) -> [SignalView; 2] {
        Side::ALL.map(|side| self.view(side, source))
    }
}

/// Compose the signal table from per-instrument enriched series.
///
/// Series are concatenated in the order given. Bars earlier than `cutoff`
/// (time of day, any date) are discarded, then every remaining bar gets its
/// flags from `rules`. A row whose call or put entry fires records its own
/// timestamp as entry time; its duration is the minutes elapsed since the
/// instrument's earliest entry in the filtered table.
pub fn compose<I>(series: I, rules: &SignalRules, cutoff: NaiveTime) -> ComposedTable
where
    I: IntoIterator<Item = Vec<EnrichedBar>>,
{
    let mut rows: Vec<SignalRow> = series
        .into_iter()
        .flatten()
        .filter(|enriched| enriched.bar.time_of_day() >= cutoff)
        .map(|enriched| {
            let flags = rules.evaluate(&enriched.indicators, enriched.bar.close);
            SignalRow::new(enriched, flags)
        })
        .collect();

    let mut first_entry: HashMap<String, NaiveDateTime> = HashMap::new();
    for row in &rows {
        if let Some(entry) = row.entry_time {
            first_entry
                .entry(row.bar.symbol.clone())
                .and_modify(|earliest| *earliest = (*earliest).min(entry))
                .or_insert(entry);
        }
    }

    for row in &mut rows {
        if let (Some(entry), Some(first)) = (row.entry_time, first_entry.get(&row.bar.symbol)) {
            row.duration_minutes = Some((entry - *first).num_seconds() as f64 / 60.0);
        }
    }

    ComposedTable { rows, cutoff }
}
