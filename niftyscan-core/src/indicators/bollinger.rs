//! Bollinger band width.
//!
//! Middle = SMA(close, period); bands = middle ± multiplier × stddev(close, period).
//! Width = (upper − lower) / close × 100, a unitless percentage of price.
//!
//! Uses population stddev (divide by N).
//! Lookback: period - 1.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct BollingerWidth {
    period: usize,
    multiplier: f64,
    name: String,
}

impl BollingerWidth {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            multiplier,
            name: format!("bb_width_{period}"),
        }
    }
}

impl Indicator for BollingerWidth {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &bars[(i + 1 - self.period)..=i];

            if window.iter().any(|b| b.close.is_nan()) {
                continue;
            }

            let mean = window.iter().map(|b| b.close).sum::<f64>() / self.period as f64;
            let variance = window
                .iter()
                .map(|b| {
                    let diff = b.close - mean;
                    diff * diff
                })
                .sum::<f64>()
                / self.period as f64;

            let upper = mean + self.multiplier * variance.sqrt();
            let lower = mean - self.multiplier * variance.sqrt();
            result[i] = (upper - lower) / bars[i].close * 100.0;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn width_of_known_window() {
        // closes 10, 11, 12: mean 11, pop stddev sqrt(2/3)
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let result = BollingerWidth::new(3, 2.0).compute(&bars);
        let expected = 4.0 * (2.0f64 / 3.0).sqrt() / 12.0 * 100.0;
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], expected, DEFAULT_EPSILON);
    }

    #[test]
    fn constant_price_zero_width() {
        let bars = make_bars(&[100.0, 100.0, 100.0, 100.0]);
        let result = BollingerWidth::new(3, 2.0).compute(&bars);
        assert_approx(result[3], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn nan_propagation() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        bars[2].close = f64::NAN;
        let result = BollingerWidth::new(3, 2.0).compute(&bars);
        assert!(result[2].is_nan());
        assert!(result[4].is_nan()); // window includes NaN bar 2
        assert!(!result[5].is_nan());
    }

    #[test]
    fn zero_close_is_non_finite() {
        let bars = make_bars(&[1.0, 2.0, 0.0]);
        let result = BollingerWidth::new(3, 2.0).compute(&bars);
        assert!(!result[2].is_finite());
    }

    #[test]
    fn lookback() {
        assert_eq!(BollingerWidth::new(60, 2.0).lookback(), 59);
        assert_eq!(BollingerWidth::new(150, 2.0).name(), "bb_width_150");
    }
}
