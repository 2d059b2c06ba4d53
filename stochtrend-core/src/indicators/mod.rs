//! Streaming indicator implementations.
//!
//! Every indicator consumes one closed bar at a time through
//! [`Indicator::update`] and keeps only the bounded state it needs. A value is
//! `None` until the indicator has seen enough bars; nothing is ever
//! zero-filled during warmup.
//!
//! Multi-series indicators (Bollinger, DMI, MACD, Stochastic-RSI) return one
//! small value struct per bar rather than being split into per-band instances.

pub mod atr;
pub mod bollinger;
pub mod dmi;
pub mod macd;
pub mod pipeline;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod stoch_rsi;

pub use atr::Atr;
pub use bollinger::{Bollinger, BollingerValue};
pub use dmi::{Dmi, DmiValue};
pub use macd::{Macd, MacdValue};
pub use pipeline::{IndicatorPipeline, IndicatorState, StateHistory};
pub use rolling::{EmaState, MovingAverage, RollingWindow, SmaState, WilderState};
pub use rsi::Rsi;
pub use sma::{PriceSource, Sma};
pub use stoch_rsi::{StochRsi, StochRsiValue};

use crate::domain::Bar;
use thiserror::Error;

/// A consumer needed an indicator value that is still in warmup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("indicator not ready: {0}")]
pub struct NotReady(pub &'static str);

/// Unwrap an optional indicator value or name the missing indicator.
pub fn require(value: Option<f64>, name: &'static str) -> Result<f64, NotReady> {
    value.ok_or(NotReady(name))
}

/// Trait for streaming indicators.
///
/// # Look-ahead contamination guard
/// The value returned for bar t may depend only on bars 0..=t. Every
/// indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    type Output: Copy;

    /// Human-readable name (e.g., "rsi_14", "atr_14").
    fn name(&self) -> &str;

    /// Index of the first bar that produces a value.
    fn lookback(&self) -> usize;

    /// Feed the next closed bar. Returns `None` during warmup.
    fn update(&mut self, bar: &Bar) -> Option<Self::Output>;

    /// Drop all accumulated state.
    fn reset(&mut self);

    /// Run a fresh copy of this indicator over a whole series.
    fn compute(&self, bars: &[Bar]) -> Vec<Option<Self::Output>>
    where
        Self: Clone,
    {
        let mut fresh = self.clone();
        fresh.reset();
        bars.iter().map(|bar| fresh.update(bar)).collect()
    }
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLCV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
/// Bars are four hours apart.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use chrono::TimeZone;
    let base = chrono::Utc
        .with_ymd_and_hms(2024, 1, 2, 4, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar::new(
                base + chrono::Duration::hours(4 * i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1000.0,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_names_missing_indicator() {
        assert_eq!(require(Some(3.0), "atr"), Ok(3.0));
        let err = require(None, "adx").unwrap_err();
        assert_eq!(err, NotReady("adx"));
        assert_eq!(err.to_string(), "indicator not ready: adx");
    }

    #[test]
    fn compute_ignores_prior_state() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0]);
        let mut sma = Sma::new(2);
        for bar in &bars {
            sma.update(bar);
        }
        let batch = sma.compute(&bars);
        assert_eq!(batch[0], None);
        assert_approx(batch[1].unwrap(), 10.5, DEFAULT_EPSILON);
    }
}
