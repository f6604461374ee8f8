//! Directional Movement Index lines (+DI / -DI, Wilder).
//!
//! Steps:
//! 1. True range and +DM / -DM from consecutive bars (defined from bar 1)
//! 2. Wilder smoothing: seed = mean of the first `period` values, then
//!    prev + (x - prev) / period
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR)
//! 4. -DI = 100 * smoothed(-DM) / smoothed(TR)
//!
//! A smoothed true range of zero leaves the line undefined (NaN).
//! Lookback: period (one bar for the first difference, then the seed window).

use super::Indicator;
use crate::domain::Bar;

/// Which directional line an instance produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmiLine {
    Plus,
    Minus,
}

#[derive(Debug, Clone)]
pub struct Dmi {
    period: usize,
    line: DmiLine,
    name: String,
}

impl Dmi {
    pub fn new(period: usize, line: DmiLine) -> Self {
        assert!(period >= 1, "DMI period must be >= 1");
        let prefix = match line {
            DmiLine::Plus => "plus_di",
            DmiLine::Minus => "minus_di",
        };
        Self {
            period,
            line,
            name: format!("{prefix}_{period}"),
        }
    }

    pub fn plus(period: usize) -> Self {
        Self::new(period, DmiLine::Plus)
    }

    pub fn minus(period: usize) -> Self {
        Self::new(period, DmiLine::Minus)
    }
}

impl Indicator for Dmi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < 2 {
            return result;
        }

        let (plus_dm, minus_dm) = directional_movement(bars);
        let dm = match self.line {
            DmiLine::Plus => plus_dm,
            DmiLine::Minus => minus_dm,
        };

        let smooth_tr = wilder_smooth(&true_range(bars), self.period);
        let smooth_dm = wilder_smooth(&dm, self.period);

        for i in 0..n {
            if smooth_tr[i].is_nan() || smooth_dm[i].is_nan() || smooth_tr[i] == 0.0 {
                continue;
            }
            result[i] = 100.0 * smooth_dm[i] / smooth_tr[i];
        }

        result
    }
}

/// True range from bar 1 onward: max(high - low, |high - prev_close|, |low - prev_close|).
/// Bar 0 has no previous close and is NaN.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut tr = vec![f64::NAN; n];

    for i in 1..n {
        let h = bars[i].high;
        let l = bars[i].low;
        let pc = bars[i - 1].close;
        if h.is_nan() || l.is_nan() || pc.is_nan() {
            continue;
        }
        tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }

    tr
}

fn directional_movement(bars: &[Bar]) -> (Vec<f64>, Vec<f64>) {
    let n = bars.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        if bars[i].high.is_nan()
            || bars[i].low.is_nan()
            || bars[i - 1].high.is_nan()
            || bars[i - 1].low.is_nan()
        {
            continue;
        }

        let up_move = bars[i].high - bars[i - 1].high;
        let down_move = bars[i - 1].low - bars[i].low;

        plus_dm[i] = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        minus_dm[i] = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };
    }

    (plus_dm, minus_dm)
}

/// Wilder smoothing (alpha = 1/period).
///
/// The seed window starts at the first non-NaN value. If the seed window
/// contains a NaN, or a NaN appears after seeding, everything from that point
/// on is NaN.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 {
        return result;
    }

    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };
    let seed_end = start + period;
    if seed_end > n {
        return result;
    }

    let seed = &values[start..seed_end];
    if seed.iter().any(|v| v.is_nan()) {
        return result;
    }

    let mut prev = seed.iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = prev;

    for i in seed_end..n {
        if values[i].is_nan() {
            break;
        }
        prev += (values[i] - prev) / period as f64;
        result[i] = prev;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};
    use chrono::NaiveDate;

    fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap();
        data.iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| Bar {
                symbol: "TEST".to_string(),
                timestamp: start + chrono::Duration::minutes(5 * i as i64),
                open,
                high,
                low,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn true_range_basic() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0), // max(8, |108-102|, |100-102|) = 8
            (106.0, 107.0, 98.0, 99.0),   // max(9, |107-106|, |98-106|) = 9
        ]);
        let tr = true_range(&bars);
        assert!(tr[0].is_nan());
        assert_approx(tr[1], 8.0, DEFAULT_EPSILON);
        assert_approx(tr[2], 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_smooth_seed_and_step() {
        let values = [f64::NAN, 2.0, 4.0, 6.0, 10.0];
        let result = wilder_smooth(&values, 2);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 3.0, DEFAULT_EPSILON);
        assert_approx(result[3], 4.5, DEFAULT_EPSILON);
        assert_approx(result[4], 7.25, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_smooth_nan_stops_series() {
        let values = [1.0, 1.0, f64::NAN, 1.0];
        let result = wilder_smooth(&values, 2);
        assert_approx(result[1], 1.0, DEFAULT_EPSILON);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
    }

    #[test]
    fn hand_computed_di() {
        // +DM: -, 3, 0    -DM: -, 0, 2    TR: -, 8, 9
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
        ]);
        let plus = Dmi::plus(2).compute(&bars);
        let minus = Dmi::minus(2).compute(&bars);
        assert!(plus[1].is_nan());
        assert_approx(plus[2], 100.0 * 1.5 / 8.5, DEFAULT_EPSILON);
        assert_approx(minus[2], 100.0 * 1.0 / 8.5, DEFAULT_EPSILON);
    }

    #[test]
    fn rising_series_favours_plus() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 2.0).collect();
        let bars = make_bars(&closes);
        let plus = Dmi::plus(6).compute(&bars);
        let minus = Dmi::minus(6).compute(&bars);
        assert!(plus[29] > 40.0);
        assert_approx(minus[29], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_bars_are_undefined() {
        let bars = make_ohlc_bars(&[(10.0, 10.0, 10.0, 10.0); 5]);
        assert!(Dmi::plus(2).compute(&bars).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn di_bounds() {
        let closes = [100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0, 101.0];
        let bars = make_bars(&closes);
        for line in [DmiLine::Plus, DmiLine::Minus] {
            for v in Dmi::new(3, line).compute(&bars) {
                if !v.is_nan() {
                    assert!((0.0..=100.0).contains(&v), "out of bounds: {v}");
                }
            }
        }
    }

    #[test]
    fn names() {
        assert_eq!(Dmi::plus(6).name(), "plus_di_6");
        assert_eq!(Dmi::minus(20).name(), "minus_di_20");
        assert_eq!(Dmi::minus(20).lookback(), 20);
    }
}
