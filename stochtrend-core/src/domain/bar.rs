//! Bar: the fundamental market data unit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for one timeframe.
///
/// `timestamp` is the instant the bar closed. A bar is only ever handed to the
/// engine once it is closed, so every value on it is final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Calendar date of the close (UTC), used for daily trade caps.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// High minus low.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns true if any OHLCV field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .any(|v| !v.is_finite())
    }

    /// Basic OHLCV sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.close > 0.0
            && self.volume >= 0.0
    }
}

/// The two bar streams the engine consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// Trend timeframe (e.g. daily).
    Slow,
    /// Signal timeframe (e.g. 4h).
    Fast,
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timeframe::Slow => write!(f, "slow"),
            Timeframe::Fast => write!(f, "fast"),
        }
    }
}

/// Reasons a bar is refused before it reaches any indicator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("{timeframe} bar at {timestamp} is not after the previous bar at {previous}")]
    OutOfOrder {
        timeframe: Timeframe,
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },
    #[error("{timeframe} bar at {timestamp} failed OHLCV sanity checks")]
    Insane {
        timeframe: Timeframe,
        timestamp: DateTime<Utc>,
    },
}

/// Check that `bar` may follow `previous` on the same timeframe.
pub fn check_sequence(
    timeframe: Timeframe,
    previous: Option<DateTime<Utc>>,
    bar: &Bar,
) -> Result<(), BarError> {
    if !bar.is_sane() {
        return Err(BarError::Insane {
            timeframe,
            timestamp: bar.timestamp,
        });
    }
    match previous {
        Some(prev) if bar.timestamp <= prev => Err(BarError::OutOfOrder {
            timeframe,
            timestamp: bar.timestamp,
            previous: prev,
        }),
        _ => Ok(()),
    }
}
