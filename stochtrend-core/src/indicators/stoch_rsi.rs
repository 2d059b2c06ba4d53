//! Stochastic RSI.
//!
//! RSI(p) → optional MA(rsi_smooth) → rolling max/min over `stoch_period` →
//! raw %K = 100 * (v - min) / (max - min), 50 when the window is flat →
//! optional MA(k_smooth) → %D = MA(%K, d_period).
//!
//! %K and %D are clamped to [0, 100] after every stage.

use super::rolling::{MovingAverage, RollingWindow};
use super::rsi::Rsi;
use super::Indicator;
use crate::config::{IndicatorConfig, MaKind};
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochRsiValue {
    pub k: f64,
    /// Trails %K by `d_period - 1` bars.
    pub d: Option<f64>,
}

fn clamp_pct(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

#[derive(Debug, Clone)]
pub struct StochRsi {
    name: String,
    lookback: usize,
    rsi: Rsi,
    rsi_smooth: Option<MovingAverage>,
    window: RollingWindow,
    k_smooth: Option<MovingAverage>,
    d: MovingAverage,
    last_rsi: Option<f64>,
}

impl StochRsi {
    pub fn new(
        rsi_period: usize,
        stoch_period: usize,
        d_period: usize,
        rsi_smooth: Option<usize>,
        k_smooth: Option<usize>,
        kind: MaKind,
    ) -> Self {
        let extra = |p: Option<usize>| p.map_or(0, |p| p - 1);
        Self {
            name: format!("stoch_rsi_{rsi_period}_{stoch_period}_{d_period}"),
            lookback: rsi_period + extra(rsi_smooth) + (stoch_period - 1) + extra(k_smooth),
            rsi: Rsi::new(rsi_period),
            rsi_smooth: rsi_smooth.map(|p| MovingAverage::new(kind, p)),
            window: RollingWindow::new(stoch_period),
            k_smooth: k_smooth.map(|p| MovingAverage::new(kind, p)),
            d: MovingAverage::new(kind, d_period),
            last_rsi: None,
        }
    }

    pub fn from_config(config: &IndicatorConfig) -> Self {
        Self::new(
            config.rsi_period,
            config.stoch_period,
            config.stoch_d_period,
            config.rsi_smooth_period,
            config.smooth_period,
            config.stoch_ma,
        )
    }

    /// Raw RSI from the most recent update.
    pub fn rsi(&self) -> Option<f64> {
        self.last_rsi
    }
}

impl Indicator for StochRsi {
    type Output = StochRsiValue;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.lookback
    }

    fn update(&mut self, bar: &Bar) -> Option<StochRsiValue> {
        self.last_rsi = self.rsi.update(bar);
        let mut value = self.last_rsi?;
        if let Some(ma) = self.rsi_smooth.as_mut() {
            value = ma.update(value)?;
        }

        self.window.push(value);
        if !self.window.is_full() {
            return None;
        }
        let (hi, lo) = (self.window.max()?, self.window.min()?);
        let raw = if hi == lo {
            50.0
        } else {
            100.0 * (value - lo) / (hi - lo)
        };

        let mut k = clamp_pct(raw);
        if let Some(ma) = self.k_smooth.as_mut() {
            k = clamp_pct(ma.update(k)?);
        }
        let d = self.d.update(k).map(clamp_pct);
        Some(StochRsiValue { k, d })
    }

    fn reset(&mut self) {
        self.rsi.reset();
        if let Some(ma) = self.rsi_smooth.as_mut() {
            ma.reset();
        }
        self.window.clear();
        if let Some(ma) = self.k_smooth.as_mut() {
            ma.reset();
        }
        self.d.reset();
        self.last_rsi = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    fn zigzag(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + 5.0 * ((i as f64) * 0.7).sin() + (i % 3) as f64)
            .collect()
    }

    #[test]
    fn lookback_matches_first_value() {
        let stoch = StochRsi::new(3, 4, 2, Some(2), Some(3), MaKind::Sma);
        // 3 + 1 + 3 + 2
        assert_eq!(stoch.lookback(), 9);
        let result = stoch.compute(&make_bars(&zigzag(30)));
        assert!(result[..9].iter().all(Option::is_none));
        assert!(result[9].is_some());
        assert_eq!(result[9].unwrap().d, None);
        assert!(result[10].unwrap().d.is_some());
    }

    #[test]
    fn unsmoothed_lookback() {
        let stoch = StochRsi::new(14, 14, 3, None, None, MaKind::Sma);
        assert_eq!(stoch.lookback(), 27);
    }

    #[test]
    fn constant_series_is_fifty() {
        let stoch = StochRsi::new(3, 3, 2, None, None, MaKind::Ema);
        for v in stoch.compute(&make_bars(&[100.0; 20])).into_iter().flatten() {
            assert_approx(v.k, 50.0, DEFAULT_EPSILON);
            if let Some(d) = v.d {
                assert_approx(d, 50.0, DEFAULT_EPSILON);
            }
        }
    }

    #[test]
    fn k_and_d_stay_in_range() {
        let closes: Vec<f64> = (0..80)
            .map(|i| 100.0 + 20.0 * ((i as f64) * 1.3).sin() * ((i as f64) * 0.11).cos())
            .collect();
        let stoch = StochRsi::new(5, 5, 3, Some(3), Some(3), MaKind::Ema);
        for v in stoch.compute(&make_bars(&closes)).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v.k), "k = {}", v.k);
            if let Some(d) = v.d {
                assert!((0.0..=100.0).contains(&d), "d = {d}");
            }
        }
    }

    #[test]
    fn raw_k_hits_extremes() {
        // Unsmoothed: after a run of gains RSI rises every bar, so the newest
        // value is the window max → %K = 100
        let mut closes = vec![100.0, 99.0, 100.0, 99.0, 100.0, 99.0];
        closes.extend((1..6).map(|i| 99.0 + i as f64));
        let stoch = StochRsi::new(2, 3, 1, None, None, MaKind::Sma);
        let result = stoch.compute(&make_bars(&closes));
        let last = result.last().unwrap().unwrap();
        assert_approx(last.k, 100.0, DEFAULT_EPSILON);
        assert_eq!(last.d, Some(last.k));
    }

    #[test]
    fn exposes_raw_rsi() {
        let mut stoch = StochRsi::new(2, 3, 2, None, None, MaKind::Sma);
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        for bar in &bars {
            stoch.update(bar);
        }
        assert_approx(stoch.rsi().unwrap(), 100.0, DEFAULT_EPSILON);
    }
}
