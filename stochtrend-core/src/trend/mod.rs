//! Slow-timeframe trend regime.

pub mod classifier;

pub use classifier::{Confirmations, TrendClassification, TrendClassifier};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Market regime derived from the slow timeframe.
///
/// Integer codes follow the usual convention: 1 up, 0 flat, -1 down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    #[default]
    Sideways,
    Bullish,
    Bearish,
}

impl TrendLabel {
    pub fn as_i8(self) -> i8 {
        match self {
            TrendLabel::Sideways => 0,
            TrendLabel::Bullish => 1,
            TrendLabel::Bearish => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid trend code {0}, expected -1, 0 or 1")]
pub struct InvalidTrendCode(pub i8);

impl TryFrom<i8> for TrendLabel {
    type Error = InvalidTrendCode;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TrendLabel::Sideways),
            1 => Ok(TrendLabel::Bullish),
            -1 => Ok(TrendLabel::Bearish),
            other => Err(InvalidTrendCode(other)),
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendLabel::Sideways => "sideways",
            TrendLabel::Bullish => "bullish",
            TrendLabel::Bearish => "bearish",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_roundtrip() {
        for label in [TrendLabel::Sideways, TrendLabel::Bullish, TrendLabel::Bearish] {
            assert_eq!(TrendLabel::try_from(label.as_i8()), Ok(label));
        }
        assert_eq!(TrendLabel::try_from(2), Err(InvalidTrendCode(2)));
    }

    #[test]
    fn default_is_sideways() {
        assert_eq!(TrendLabel::default(), TrendLabel::Sideways);
        assert_eq!(TrendLabel::Bearish.to_string(), "bearish");
        assert_eq!(
            serde_json::to_string(&TrendLabel::Bullish).unwrap(),
            "\"bullish\""
        );
    }
}
