//! MACD: EMA(fast) - EMA(slow) of close, with an EMA signal line.
//!
//! MACD is available from bar `slow - 1`; the signal line `signal - 1` bars later.

use super::rolling::EmaState;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: Option<f64>,
}

impl MacdValue {
    pub fn histogram(&self) -> Option<f64> {
        self.signal.map(|s| self.macd - s)
    }
}

#[derive(Debug, Clone)]
pub struct Macd {
    slow_period: usize,
    name: String,
    fast: EmaState,
    slow: EmaState,
    signal: EmaState,
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        assert!(
            fast_period >= 1 && fast_period < slow_period,
            "MACD needs 1 <= fast < slow"
        );
        assert!(signal_period >= 1, "MACD signal period must be >= 1");
        Self {
            slow_period,
            name: format!("macd_{fast_period}_{slow_period}_{signal_period}"),
            fast: EmaState::new(fast_period),
            slow: EmaState::new(slow_period),
            signal: EmaState::new(signal_period),
        }
    }
}

impl Indicator for Macd {
    type Output = MacdValue;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.slow_period - 1
    }

    fn update(&mut self, bar: &Bar) -> Option<MacdValue> {
        let fast = self.fast.update(bar.close);
        let slow = self.slow.update(bar.close)?;
        let macd = fast? - slow;
        Some(MacdValue {
            macd,
            signal: self.signal.update(macd),
        })
    }

    fn reset(&mut self) {
        self.fast.reset();
        self.slow.reset();
        self.signal.reset();
    }
}
