//! Relative Strength Index (RSI).
//!
//! Up and down moves are smoothed with an exponential average
//! (alpha = 1/period, no bias adjustment) seeded at the first bar, where the
//! move is taken as zero. A NaN price change counts as no move.
//! RSI = 100 - 100 / (1 + avg_up / avg_down); avg_down == 0 → 100.
//! Lookback: period - 1.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
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

        let alpha = 1.0 / self.period as f64;
        let mut avg_up = 0.0;
        let mut avg_down = 0.0;

        for i in 0..n {
            let change = if i == 0 {
                f64::NAN
            } else {
                bars[i].close - bars[i - 1].close
            };
            // NaN comparisons are false, so a missing change is no move
            let up = if change > 0.0 { change } else { 0.0 };
            let down = if change < 0.0 { -change } else { 0.0 };

            if i == 0 {
                avg_up = up;
                avg_down = down;
            } else {
                avg_up = (1.0 - alpha) * avg_up + alpha * up;
                avg_down = (1.0 - alpha) * avg_down + alpha * down;
            }

            if i + 1 >= self.period {
                result[i] = compute_rsi(avg_up, avg_down);
            }
        }

        result
    }
}

fn compute_rsi(avg_up: f64, avg_down: f64) -> f64 {
    if avg_down == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_up / avg_down)
    }
}
