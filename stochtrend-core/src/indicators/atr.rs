//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|), defined
//! from bar 1 onward.
//! ATR uses Wilder smoothing seeded with the mean of the first `period` TRs.
//! Lookback: period.

use super::rolling::WilderState;
use super::Indicator;
use crate::domain::Bar;

/// True range of `bar` against the previous close.
pub fn true_range(bar: &Bar, prev_close: f64) -> f64 {
    (bar.high - bar.low)
        .max((bar.high - prev_close).abs())
        .max((bar.low - prev_close).abs())
}

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
    prev_close: Option<f64>,
    smoother: WilderState,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
            prev_close: None,
            smoother: WilderState::new(period),
        }
    }
}

impl Indicator for Atr {
    type Output = f64;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn update(&mut self, bar: &Bar) -> Option<f64> {
        let prev_close = self.prev_close.replace(bar.close)?;
        self.smoother.update(true_range(bar, prev_close))
    }

    fn reset(&mut self) {
        self.prev_close = None;
        self.smoother.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn true_range_uses_gap() {
        let bars = make_bars(&[100.0, 110.0]);
        // bar1: open 100, high 111, low 99; prev close 100 → max(12, 11, 1)
        assert_approx(true_range(&bars[1], 100.0), 12.0, DEFAULT_EPSILON);
        // gap down from 130: |99 - 130| = 31
        assert_approx(true_range(&bars[1], 130.0), 31.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_constant_range() {
        // make_bars with flat closes → every TR is 2.0
        let bars = make_bars(&[50.0; 8]);
        let result = Atr::new(3).compute(&bars);
        assert_eq!(&result[..3], &[None, None, None]);
        for v in &result[3..] {
            assert_approx(v.unwrap(), 2.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn atr_wilder_step() {
        let bars = make_bars(&[100.0, 101.0, 103.0, 100.0]);
        let trs: Vec<f64> = (1..4).map(|i| true_range(&bars[i], bars[i - 1].close)).collect();
        let result = Atr::new(2).compute(&bars);
        assert_eq!(result[1], None);
        let seed = (trs[0] + trs[1]) / 2.0;
        assert_approx(result[2].unwrap(), seed, DEFAULT_EPSILON);
        assert_approx(result[3].unwrap(), 0.5 * trs[2] + 0.5 * seed, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_lookback() {
        assert_eq!(Atr::new(14).lookback(), 14);
    }
}
