//! Per-bar indicator snapshot.

use serde::{Deserialize, Serialize};

use super::bar::Bar;

/// Derived indicator values attached to one bar.
///
/// `None` means the value is undefined at this bar, either because the
/// trailing window is not yet full or because the computation produced a
/// non-finite number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub bb60: Option<f64>,
    pub bb105: Option<f64>,
    pub bb150: Option<f64>,
    pub rsi20: Option<f64>,
    pub willr28: Option<f64>,
    pub plus_di6: Option<f64>,
    pub minus_di6: Option<f64>,
    pub plus_di20: Option<f64>,
    pub minus_di20: Option<f64>,
    pub ma8: Option<f64>,
}

impl IndicatorSet {
    /// True when every field is defined.
    pub fn is_complete(&self) -> bool {
        [
            self.bb60,
            self.bb105,
            self.bb150,
            self.rsi20,
            self.willr28,
            self.plus_di6,
            self.minus_di6,
            self.plus_di20,
            self.minus_di20,
            self.ma8,
        ]
        .iter()
        .all(Option::is_some)
    }
}

/// Map an indicator output to the missing-value convention: NaN and ±inf become `None`.
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// A bar together with its indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedBar {
    pub bar: Bar,
    pub indicators: IndicatorSet,
}
