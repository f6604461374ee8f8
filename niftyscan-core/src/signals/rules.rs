//! Entry and exit rules.
//!
//! Every comparison is evaluated on the current bar only. A missing operand
//! makes its comparison false, so a missing indicator can never fire a signal.

use serde::{Deserialize, Serialize};

use crate::domain::{IndicatorSet, Side, SignalFlags};

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: Option<f64>) -> bool {
        matches!(value, Some(v) if v >= self.min && v <= self.max)
    }

    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

/// Thresholds for one side's entry.
///
/// "with" is the directional line pointing the way of the trade (+DI for
/// calls, -DI for puts); "against" is the opposite line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryRule {
    pub max_band_width: f64,
    pub short_with_min: f64,
    pub short_against_max: f64,
    pub long_with_min: f64,
    pub long_against_max: f64,
    pub momentum: Bounds,
    pub williams: Bounds,
}

impl EntryRule {
    pub fn call() -> Self {
        Self {
            max_band_width: 35.0,
            short_with_min: 40.0,
            short_against_max: 12.0,
            long_with_min: 35.0,
            long_against_max: 15.0,
            momentum: Bounds::new(65.0, 100.0),
            williams: Bounds::new(-20.0, 0.0),
        }
    }

    pub fn put() -> Self {
        Self {
            max_band_width: 35.0,
            short_with_min: 35.0,
            short_against_max: 15.0,
            long_with_min: 30.0,
            long_against_max: 15.0,
            momentum: Bounds::new(1.0, 40.0),
            williams: Bounds::new(-100.0, -80.0),
        }
    }
}

/// The full rule set. Defaults are the screening contract; configuration may
/// override them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalRules {
    /// Directional spread below which both sides are considered exhausted.
    pub exit_spread: f64,
    pub call: EntryRule,
    pub put: EntryRule,
}

impl Default for SignalRules {
    fn default() -> Self {
        Self {
            exit_spread: 10.0,
            call: EntryRule::call(),
            put: EntryRule::put(),
        }
    }
}

impl SignalRules {
    pub fn rule(&self, side: Side) -> &EntryRule {
        match side {
            Side::Call => &self.call,
            Side::Put => &self.put,
        }
    }

    pub fn entry(&self, side: Side, ind: &IndicatorSet) -> bool {
        let rule = self.rule(side);
        let (short_with, short_against, long_with, long_against) = match side {
            Side::Call => (ind.plus_di6, ind.minus_di6, ind.plus_di20, ind.minus_di20),
            Side::Put => (ind.minus_di6, ind.plus_di6, ind.minus_di20, ind.plus_di20),
        };

        at_most(ind.bb60, rule.max_band_width)
            && rule.momentum.contains(ind.rsi20)
            && rule.williams.contains(ind.willr28)
            && at_least(short_with, rule.short_with_min)
            && at_most(short_against, rule.short_against_max)
            && at_least(long_with, rule.long_with_min)
            && at_most(long_against, rule.long_against_max)
    }

    pub fn exit(&self, side: Side, ind: &IndicatorSet, close: f64) -> bool {
        let spread = match (ind.plus_di20, ind.minus_di20) {
            (Some(plus), Some(minus)) => Some((plus - minus).abs()),
            _ => None,
        };
        let exhausted = matches!(spread, Some(s) if s < self.exit_spread);

        let below_average = match (side, ind.ma8) {
            (Side::Call, Some(ma)) => close < ma,
            (Side::Put, Some(ma)) => close > ma,
            (_, None) => false,
        };

        exhausted || below_average
    }

    pub fn evaluate(&self, ind: &IndicatorSet, close: f64) -> SignalFlags {
        SignalFlags {
            call_entry: self.entry(Side::Call, ind),
            put_entry: self.entry(Side::Put, ind),
            call_exit: self.exit(Side::Call, ind, close),
            put_exit: self.exit(Side::Put, ind, close),
        }
    }

    /// True when no indicator snapshot can satisfy both entries at once.
    pub fn entries_exclusive(&self) -> bool {
        !self.call.momentum.overlaps(&self.put.momentum)
            || !self.call.williams.overlaps(&self.put.williams)
    }
}

fn at_most(value: Option<f64>, bound: f64) -> bool {
    matches!(value, Some(v) if v <= bound)
}

fn at_least(value: Option<f64>, bound: f64) -> bool {
    matches!(value, Some(v) if v >= bound)
}
