//! Value-level building blocks shared by the bar indicators.
//!
//! These work on plain `f64` inputs so that composed indicators (Stochastic-RSI,
//! MACD, DMI, the ATR average) can smooth arbitrary derived series.

use std::collections::VecDeque;

use crate::config::MaKind;

/// Fixed-capacity window over the most recent values.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "window capacity must be >= 1");
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    pub fn min(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::min)
    }

    /// Mean over the window. Summed fresh each call so there is no drift.
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// Population standard deviation (divide by N).
    pub fn population_std(&self) -> Option<f64> {
        let mean = self.mean()?;
        let var = self
            .values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / self.values.len() as f64;
        Some(var.sqrt())
    }
}

/// Simple moving average of the last `period` values.
#[derive(Debug, Clone)]
pub struct SmaState {
    window: RollingWindow,
}

impl SmaState {
    pub fn new(period: usize) -> Self {
        Self {
            window: RollingWindow::new(period),
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.window.push(value);
        if self.window.is_full() {
            self.window.mean()
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}

/// Exponential smoothing seeded with the mean of the first `period` inputs.
///
/// `alpha` is 2/(p+1) for an EMA and 1/p for Wilder smoothing; both share the
/// same seed rule so the first value lands on input index `period - 1`.
#[derive(Debug, Clone)]
struct SeededSmoother {
    period: usize,
    alpha: f64,
    seen: usize,
    seed_sum: f64,
    value: Option<f64>,
}

impl SeededSmoother {
    fn new(period: usize, alpha: f64) -> Self {
        assert!(period >= 1, "smoothing period must be >= 1");
        Self {
            period,
            alpha,
            seen: 0,
            seed_sum: 0.0,
            value: None,
        }
    }

    fn update(&mut self, input: f64) -> Option<f64> {
        match self.value {
            Some(prev) => {
                let next = self.alpha * input + (1.0 - self.alpha) * prev;
                self.value = Some(next);
            }
            None => {
                self.seen += 1;
                self.seed_sum += input;
                if self.seen == self.period {
                    self.value = Some(self.seed_sum / self.period as f64);
                }
            }
        }
        self.value
    }

    fn reset(&mut self) {
        self.seen = 0;
        self.seed_sum = 0.0;
        self.value = None;
    }
}

/// EMA with alpha = 2/(period+1), seeded by the SMA of the first `period` inputs.
#[derive(Debug, Clone)]
pub struct EmaState(SeededSmoother);

impl EmaState {
    pub fn new(period: usize) -> Self {
        Self(SeededSmoother::new(period, 2.0 / (period as f64 + 1.0)))
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.0.update(value)
    }

    pub fn value(&self) -> Option<f64> {
        self.0.value
    }

    pub fn reset(&mut self) {
        self.0.reset();
    }
}

/// Wilder smoothing (alpha = 1/period), seeded by the mean of the first `period` inputs.
#[derive(Debug, Clone)]
pub struct WilderState(SeededSmoother);

impl WilderState {
    pub fn new(period: usize) -> Self {
        Self(SeededSmoother::new(period, 1.0 / period as f64))
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.0.update(value)
    }

    pub fn value(&self) -> Option<f64> {
        self.0.value
    }

    pub fn reset(&mut self) {
        self.0.reset();
    }
}

/// Configurable SMA/EMA used for Stochastic-RSI smoothing and the trend MAs.
#[derive(Debug, Clone)]
pub enum MovingAverage {
    Sma(SmaState),
    Ema(EmaState),
}

impl MovingAverage {
    pub fn new(kind: MaKind, period: usize) -> Self {
        match kind {
            MaKind::Sma => MovingAverage::Sma(SmaState::new(period)),
            MaKind::Ema => MovingAverage::Ema(EmaState::new(period)),
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        match self {
            MovingAverage::Sma(s) => s.update(value),
            MovingAverage::Ema(e) => e.update(value),
        }
    }

    pub fn reset(&mut self) {
        match self {
            MovingAverage::Sma(s) => s.reset(),
            MovingAverage::Ema(e) => e.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn window_evicts_oldest() {
        let mut w = RollingWindow::new(3);
        for v in [1.0, 5.0, 3.0, 2.0] {
            w.push(v);
        }
        assert_eq!(w.len(), 3);
        assert_eq!(w.max(), Some(5.0));
        assert_eq!(w.min(), Some(2.0));
        w.push(1.0);
        assert_eq!(w.max(), Some(3.0));
    }

    #[test]
    fn population_std_known_value() {
        let mut w = RollingWindow::new(4);
        for v in [2.0, 4.0, 4.0, 6.0] {
            w.push(v);
        }
        // mean 4, squared deviations 4+0+0+4 = 8, /4 = 2
        assert_approx(w.population_std().unwrap(), 2.0_f64.sqrt(), DEFAULT_EPSILON);
    }

    #[test]
    fn sma_state_warmup() {
        let mut sma = SmaState::new(3);
        assert_eq!(sma.update(1.0), None);
        assert_eq!(sma.update(2.0), None);
        assert_approx(sma.update(3.0).unwrap(), 2.0, DEFAULT_EPSILON);
        assert_approx(sma.update(7.0).unwrap(), 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_state_seeded_by_sma() {
        // alpha = 0.5; seed = mean(10, 11, 12) = 11; next = 0.5*13 + 0.5*11 = 12
        let mut ema = EmaState::new(3);
        ema.update(10.0);
        ema.update(11.0);
        assert_approx(ema.update(12.0).unwrap(), 11.0, DEFAULT_EPSILON);
        assert_approx(ema.update(13.0).unwrap(), 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_state_alpha_is_one_over_period() {
        // seed = mean(2, 4) = 3; next = 0.5*5 + 0.5*3 = 4
        let mut w = WilderState::new(2);
        assert_eq!(w.update(2.0), None);
        assert_approx(w.update(4.0).unwrap(), 3.0, DEFAULT_EPSILON);
        assert_approx(w.update(5.0).unwrap(), 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn reset_restarts_warmup() {
        let mut ma = MovingAverage::new(MaKind::Ema, 2);
        ma.update(1.0);
        assert!(ma.update(2.0).is_some());
        ma.reset();
        assert_eq!(ma.update(3.0), None);
    }
}
