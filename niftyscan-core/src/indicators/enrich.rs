//! Attach the screening indicator set to one instrument's bar history.

use super::{BollingerWidth, Dmi, Indicator, Rsi, Sma, WilliamsR};
use crate::domain::{finite, Bar, EnrichedBar, IndicatorSet};

pub const BAND_MULTIPLIER: f64 = 2.0;
pub const BAND_PERIODS: [usize; 3] = [60, 105, 150];
pub const RSI_PERIOD: usize = 20;
pub const WILLIAMS_PERIOD: usize = 28;
pub const DMI_SHORT: usize = 6;
pub const DMI_LONG: usize = 20;
pub const MA_PERIOD: usize = 8;

/// Compute every indicator over the full chronological history of one
/// instrument and pair each bar with its values.
///
/// Bars must belong to a single instrument and be ordered by timestamp.
/// Undefined or non-finite values are recorded as `None`.
pub fn attach_indicators(bars: Vec<Bar>) -> Vec<EnrichedBar> {
    let [p60, p105, p150] = BAND_PERIODS;
    let bb60 = BollingerWidth::new(p60, BAND_MULTIPLIER).compute(&bars);
    let bb105 = BollingerWidth::new(p105, BAND_MULTIPLIER).compute(&bars);
    let bb150 = BollingerWidth::new(p150, BAND_MULTIPLIER).compute(&bars);
    let rsi20 = Rsi::new(RSI_PERIOD).compute(&bars);
    let willr28 = WilliamsR::new(WILLIAMS_PERIOD).compute(&bars);
    let plus_di6 = Dmi::plus(DMI_SHORT).compute(&bars);
    let minus_di6 = Dmi::minus(DMI_SHORT).compute(&bars);
    let plus_di20 = Dmi::plus(DMI_LONG).compute(&bars);
    let minus_di20 = Dmi::minus(DMI_LONG).compute(&bars);
    let ma8 = Sma::new(MA_PERIOD).compute(&bars);

    bars.into_iter()
        .enumerate()
        .map(|(i, bar)| EnrichedBar {
            bar,
            indicators: IndicatorSet {
                bb60: finite(bb60[i]),
                bb105: finite(bb105[i]),
                bb150: finite(bb150[i]),
                rsi20: finite(rsi20[i]),
                willr28: finite(willr28[i]),
                plus_di6: finite(plus_di6[i]),
                minus_di6: finite(minus_di6[i]),
                plus_di20: finite(plus_di20[i]),
                minus_di20: finite(minus_di20[i]),
                ma8: finite(ma8[i]),
            },
        })
        .collect()
}
