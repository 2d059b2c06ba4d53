//! Simple Moving Average (SMA) of close or volume.
//!
//! SMA[t] = mean(source[t-period+1..=t])
//! Lookback: period - 1.

use super::rolling::SmaState;
use super::Indicator;
use crate::domain::Bar;

/// Which bar field a single-series indicator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Close,
    Volume,
}

impl PriceSource {
    pub fn read(&self, bar: &Bar) -> f64 {
        match self {
            PriceSource::Close => bar.close,
            PriceSource::Volume => bar.volume,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    source: PriceSource,
    name: String,
    state: SmaState,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self::with_source(period, PriceSource::Close)
    }

    /// SMA of bar volume.
    pub fn volume(period: usize) -> Self {
        Self::with_source(period, PriceSource::Volume)
    }

    fn with_source(period: usize, source: PriceSource) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        let name = match source {
            PriceSource::Close => format!("sma_{period}"),
            PriceSource::Volume => format!("volume_sma_{period}"),
        };
        Self {
            period,
            source,
            name,
            state: SmaState::new(period),
        }
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn update(&mut self, bar: &Bar) -> Option<f64> {
        self.state.update(self.source.read(bar))
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}
