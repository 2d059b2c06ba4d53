//! Run fingerprinting: deterministic identification of a configuration and
//! the bar data it was replayed on.
//!
//! Hashes are BLAKE3 over canonical serde_json, so they are stable across
//! builds and platforms.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::StrategyConfig;
use crate::domain::Bar;

/// Exact identity of a `StrategyConfig` (every parameter value).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl ConfigHash {
    pub fn of(config: &StrategyConfig) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(config)?;
        Ok(Self(blake3::hash(json.as_bytes()).to_hex().to_string()))
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one bar series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    /// Hash bars incrementally, one canonical JSON line per bar.
    pub fn of_bars(bars: &[Bar]) -> Result<Self, serde_json::Error> {
        let mut hasher = blake3::Hasher::new();
        for bar in bars {
            hasher.update(serde_json::to_string(bar)?.as_bytes());
            hasher.update(b"\n");
        }
        Ok(Self(hasher.finalize().to_hex().to_string()))
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything needed to say which configuration ran on which data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFingerprint {
    pub config_hash: ConfigHash,
    pub slow_dataset: DatasetHash,
    pub fast_dataset: DatasetHash,
    pub slow_bars: usize,
    pub fast_bars: usize,
}

impl RunFingerprint {
    pub fn new(
        config: &StrategyConfig,
        slow: &[Bar],
        fast: &[Bar],
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            config_hash: ConfigHash::of(config)?,
            slow_dataset: DatasetHash::of_bars(slow)?,
            fast_dataset: DatasetHash::of_bars(fast)?,
            slow_bars: slow.len(),
            fast_bars: fast.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar(close: f64) -> Bar {
        Bar::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            close,
            close + 1.0,
            close - 1.0,
            close,
            10.0,
        )
    }

    #[test]
    fn config_hash_is_deterministic() {
        let a = ConfigHash::of(&StrategyConfig::default()).unwrap();
        let b = ConfigHash::of(&StrategyConfig::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.0.len(), 64);
        assert_eq!(a.short().len(), 12);
    }

    #[test]
    fn config_hash_changes_with_params() {
        let mut changed = StrategyConfig::default();
        changed.risk.stop_loss_multiplier = 2.5;
        assert_ne!(
            ConfigHash::of(&StrategyConfig::default()).unwrap(),
            ConfigHash::of(&changed).unwrap()
        );
    }

    #[test]
    fn dataset_hash_depends_on_order() {
        let ab = DatasetHash::of_bars(&[bar(1.0), bar(2.0)]).unwrap();
        let ba = DatasetHash::of_bars(&[bar(2.0), bar(1.0)]).unwrap();
        assert_ne!(ab, ba);
    }

    #[test]
    fn fingerprint_counts_bars() {
        let fp = RunFingerprint::new(&StrategyConfig::default(), &[bar(1.0)], &[]).unwrap();
        assert_eq!(fp.slow_bars, 1);
        assert_eq!(fp.fast_bars, 0);
    }
}
