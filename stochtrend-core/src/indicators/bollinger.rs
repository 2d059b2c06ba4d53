//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses population stddev (divide by N).
//! Lookback: period - 1.

use super::rolling::RollingWindow;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerValue {
    pub upper: f64,
    pub mid: f64,
    pub lower: f64,
}

impl BollingerValue {
    /// Channel width as a percentage of the mid band. `None` when mid is 0.
    pub fn width_pct(&self) -> Option<f64> {
        if self.mid == 0.0 {
            return None;
        }
        Some((self.upper - self.lower) / self.mid * 100.0)
    }

    /// Whether `price` sits inside the bands (inclusive).
    pub fn contains(&self, price: f64) -> bool {
        self.lower <= price && price <= self.upper
    }
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    name: String,
    window: RollingWindow,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            multiplier,
            name: format!("bollinger_{period}_{multiplier}"),
            window: RollingWindow::new(period),
        }
    }
}

impl Indicator for Bollinger {
    type Output = BollingerValue;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn update(&mut self, bar: &Bar) -> Option<BollingerValue> {
        self.window.push(bar.close);
        if !self.window.is_full() {
            return None;
        }
        let mid = self.window.mean()?;
        let std = self.window.population_std()?;
        Some(BollingerValue {
            upper: mid + self.multiplier * std,
            mid,
            lower: mid - self.multiplier * std,
        })
    }

    fn reset(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn bollinger_known_values() {
        // window [2, 4, 4, 6]: mean 4, population std sqrt(2)
        let bars = make_bars(&[2.0, 4.0, 4.0, 6.0]);
        let result = Bollinger::new(4, 2.0).compute(&bars);
        assert_eq!(result[2], None);
        let v = result[3].unwrap();
        assert_approx(v.mid, 4.0, DEFAULT_EPSILON);
        assert_approx(v.upper, 4.0 + 2.0 * 2.0_f64.sqrt(), DEFAULT_EPSILON);
        assert_approx(v.lower, 4.0 - 2.0 * 2.0_f64.sqrt(), DEFAULT_EPSILON);
    }

    #[test]
    fn flat_series_collapses_bands() {
        let bars = make_bars(&[100.0; 5]);
        let v = Bollinger::new(3, 2.0).compute(&bars)[4].unwrap();
        assert_eq!(v.upper, v.lower);
        assert_approx(v.width_pct().unwrap(), 0.0, DEFAULT_EPSILON);
        assert!(v.contains(100.0));
    }

    #[test]
    fn width_pct_of_mid() {
        let v = BollingerValue {
            upper: 105.0,
            mid: 100.0,
            lower: 95.0,
        };
        assert_approx(v.width_pct().unwrap(), 10.0, DEFAULT_EPSILON);
        assert!(!v.contains(94.0));
    }

    #[test]
    fn bollinger_lookback() {
        assert_eq!(Bollinger::new(20, 2.0).lookback(), 19);
    }
}
