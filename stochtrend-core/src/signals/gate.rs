//! Trend-dependent entry preconditions.
//!
//! Bullish trends are ungated. Sideways trends only buy from a low %K; bearish
//! trends additionally need price near the lower band on a volume surge.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::EntryGateConfig;
use crate::indicators::{require, IndicatorState, NotReady};
use crate::trend::TrendLabel;

/// The rule that closed the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateRule {
    SidewaysStochTooHigh,
    BearishStochTooHigh,
    BearishAboveLowerBand,
    BearishNoVolumeSurge,
}

impl fmt::Display for GateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateRule::SidewaysStochTooHigh => "sideways: %K too high",
            GateRule::BearishStochTooHigh => "bearish: %K too high",
            GateRule::BearishAboveLowerBand => "bearish: close too far above lower band",
            GateRule::BearishNoVolumeSurge => "bearish: no volume surge",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct EntryGate {
    config: EntryGateConfig,
}

impl EntryGate {
    pub fn new(config: EntryGateConfig) -> Self {
        Self { config }
    }

    /// `Ok(None)` when entries may proceed, `Ok(Some(rule))` when blocked.
    pub fn check(
        &self,
        state: &IndicatorState,
        trend: TrendLabel,
    ) -> Result<Option<GateRule>, NotReady> {
        if !self.config.enabled {
            return Ok(None);
        }
        let cfg = &self.config;
        match trend {
            TrendLabel::Bullish => Ok(None),
            TrendLabel::Sideways => {
                let k = require(state.stoch_k, "stoch_k")?;
                Ok((k >= cfg.sideways_max_k).then_some(GateRule::SidewaysStochTooHigh))
            }
            TrendLabel::Bearish => {
                let k = require(state.stoch_k, "stoch_k")?;
                let lower = require(state.boll_lower, "boll_lower")?;
                let volume_ma = require(state.volume_ma_long, "volume_ma_long")?;
                if k >= cfg.bearish_max_k {
                    Ok(Some(GateRule::BearishStochTooHigh))
                } else if state.close() > lower * cfg.bearish_lower_band_tolerance {
                    Ok(Some(GateRule::BearishAboveLowerBand))
                } else if state.bar.volume <= volume_ma * cfg.bearish_volume_surge {
                    Ok(Some(GateRule::BearishNoVolumeSurge))
                } else {
                    Ok(None)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;
    use chrono::{TimeZone, Utc};

    fn state(k: f64, close: f64, volume: f64) -> IndicatorState {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        IndicatorState {
            bar_index: 0,
            bar: Bar::new(ts, close, close + 1.0, close - 1.0, close, volume),
            rsi: None,
            stoch_k: Some(k),
            stoch_d: Some(k),
            atr: None,
            atr_avg: None,
            boll_upper: Some(110.0),
            boll_mid: Some(100.0),
            boll_lower: Some(90.0),
            plus_di: None,
            minus_di: None,
            adx: None,
            fast_ma: None,
            slow_ma: None,
            macd: None,
            macd_signal: None,
            volume_ma_short: None,
            volume_ma_long: Some(1000.0),
        }
    }

    fn gate() -> EntryGate {
        EntryGate::new(EntryGateConfig::default())
    }

    #[test]
    fn bullish_is_ungated() {
        assert_eq!(gate().check(&state(95.0, 200.0, 0.0), TrendLabel::Bullish), Ok(None));
    }

    #[test]
    fn sideways_needs_low_k() {
        let g = gate();
        assert_eq!(g.check(&state(35.0, 100.0, 1000.0), TrendLabel::Sideways), Ok(None));
        assert_eq!(
            g.check(&state(40.0, 100.0, 1000.0), TrendLabel::Sideways),
            Ok(Some(GateRule::SidewaysStochTooHigh))
        );
    }

    #[test]
    fn bearish_rules_in_order() {
        let g = gate();
        assert_eq!(
            g.check(&state(31.0, 90.0, 2000.0), TrendLabel::Bearish),
            Ok(Some(GateRule::BearishStochTooHigh))
        );
        // 90 * 1.02 = 91.8
        assert_eq!(
            g.check(&state(20.0, 92.0, 2000.0), TrendLabel::Bearish),
            Ok(Some(GateRule::BearishAboveLowerBand))
        );
        assert_eq!(
            g.check(&state(20.0, 91.0, 1200.0), TrendLabel::Bearish),
            Ok(Some(GateRule::BearishNoVolumeSurge))
        );
        assert_eq!(g.check(&state(20.0, 91.0, 1300.0), TrendLabel::Bearish), Ok(None));
    }

    #[test]
    fn disabled_gate_always_open() {
        let g = EntryGate::new(EntryGateConfig {
            enabled: false,
            ..EntryGateConfig::default()
        });
        assert_eq!(g.check(&state(99.0, 100.0, 0.0), TrendLabel::Bearish), Ok(None));
    }

    #[test]
    fn bearish_without_volume_average_is_not_ready() {
        let mut s = state(20.0, 91.0, 2000.0);
        s.volume_ma_long = None;
        assert_eq!(
            gate().check(&s, TrendLabel::Bearish),
            Err(NotReady("volume_ma_long"))
        );
    }
}
