//! Composed signal rows.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::bar::Bar;
use super::indicator_set::{EnrichedBar, IndicatorSet};

/// Trade direction of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Call,
    Put,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Call, Side::Put];

    pub fn label(self) -> &'static str {
        match self {
            Side::Call => "CALL SIDE",
            Side::Put => "PUT SIDE",
        }
    }
}

/// Entry/exit flags for one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalFlags {
    pub call_entry: bool,
    pub put_entry: bool,
    pub call_exit: bool,
    pub put_exit: bool,
}

impl SignalFlags {
    pub fn entry(&self, side: Side) -> bool {
        match side {
            Side::Call => self.call_entry,
            Side::Put => self.put_entry,
        }
    }

    pub fn exit(&self, side: Side) -> bool {
        match side {
            Side::Call => self.call_exit,
            Side::Put => self.put_exit,
        }
    }

    /// Entry fired and the paired exit did not, on the same bar.
    pub fn is_active(&self, side: Side) -> bool {
        self.entry(side) && !self.exit(side)
    }

    pub fn any_entry(&self) -> bool {
        self.call_entry || self.put_entry
    }
}

/// One row of the composed table. Immutable once composed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub bar: Bar,
    pub indicators: IndicatorSet,
    pub flags: SignalFlags,
    pub entry_time: Option<NaiveDateTime>,
    pub duration_minutes: Option<f64>,
}

impl SignalRow {
    pub fn new(enriched: EnrichedBar, flags: SignalFlags) -> Self {
        let entry_time = flags.any_entry().then_some(enriched.bar.timestamp);
        Self {
            bar: enriched.bar,
            indicators: enriched.indicators,
            flags,
            entry_time,
            duration_minutes: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.bar.symbol
    }
}
