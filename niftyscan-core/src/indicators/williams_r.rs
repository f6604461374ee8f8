//! Williams %R.
//!
//! %R = -100 × (highest high − close) / (highest high − lowest low) over the
//! trailing `period` bars. Ranges from -100 to 0. A window with zero range has
//! no defined value (NaN). Any NaN in the window yields NaN.
//! Lookback: period - 1.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
    name: String,
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Williams %R period must be >= 1");
        Self {
            period,
            name: format!("willr_{period}"),
        }
    }
}

impl Indicator for WilliamsR {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &bars[(i + 1 - self.period)..=i];
            if window.iter().any(|b| b.high.is_nan() || b.low.is_nan()) {
                continue;
            }

            let highest_high = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let lowest_low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let range = highest_high - lowest_low;

            if range > 0.0 {
                result[i] = -100.0 * (highest_high - bars[i].close) / range;
            }
        }

        result
    }
}
