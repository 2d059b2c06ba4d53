//! Trend classification from the slow-timeframe indicator state.
//!
//! Rules, first match wins:
//! 1. ADX below threshold and price inside the bands (or the channel is
//!    narrow) → Sideways
//! 2. +DI > -DI, ADX at/above threshold, close above mid, mid rising, volume
//!    surge and expanded ATR → Bullish
//! 3. -DI > +DI, ADX at/above threshold, close below mid, mid falling and
//!    expanded ATR → Bearish
//! 4. Sideways

use serde::{Deserialize, Serialize};

use super::TrendLabel;
use crate::config::TrendConfig;
use crate::indicators::{require, IndicatorState, NotReady, StateHistory};

/// Extra history beyond the mid-band run before any confirmation is trusted.
const HISTORY_MARGIN: usize = 5;

/// Secondary conditions evaluated alongside DMI. Kept for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmations {
    pub mid_rising: bool,
    pub mid_falling: bool,
    pub volume_surge: bool,
    pub volatility_expanded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendClassification {
    pub label: TrendLabel,
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    /// `None` when the mid band is zero.
    pub channel_width_pct: Option<f64>,
    pub confirmations: Confirmations,
}

#[derive(Debug, Clone)]
pub struct TrendClassifier {
    config: TrendConfig,
}

impl TrendClassifier {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    /// Classify the latest slow bar. `history` must already contain `state`.
    pub fn classify(
        &self,
        state: &IndicatorState,
        history: &StateHistory,
    ) -> Result<TrendClassification, NotReady> {
        let adx = require(state.adx, "adx")?;
        let plus_di = require(state.plus_di, "plus_di")?;
        let minus_di = require(state.minus_di, "minus_di")?;
        let bands = state.bollinger()?;
        let close = state.close();
        let cfg = &self.config;

        let confirmations = self.confirmations(state, history);
        let channel_width_pct = bands.width_pct();
        let narrow = channel_width_pct.is_some_and(|w| w < cfg.boll_channel_width_threshold);
        let trending = adx >= cfg.adx_threshold;

        let label = if !trending && (bands.contains(close) || narrow) {
            TrendLabel::Sideways
        } else if plus_di > minus_di
            && trending
            && close > bands.mid
            && confirmations.mid_rising
            && confirmations.volume_surge
            && confirmations.volatility_expanded
        {
            TrendLabel::Bullish
        } else if minus_di > plus_di
            && trending
            && close < bands.mid
            && confirmations.mid_falling
            && confirmations.volatility_expanded
        {
            TrendLabel::Bearish
        } else {
            TrendLabel::Sideways
        };

        Ok(TrendClassification {
            label,
            adx,
            plus_di,
            minus_di,
            channel_width_pct,
            confirmations,
        })
    }

    fn confirmations(&self, state: &IndicatorState, history: &StateHistory) -> Confirmations {
        let cfg = &self.config;
        if history.len() < cfg.boll_mid_rising_periods + HISTORY_MARGIN {
            return Confirmations::default();
        }

        let volume_surge = match state.volume_ma_short {
            Some(avg) if avg > 0.0 => state.bar.volume / avg > cfg.volume_ratio_threshold,
            _ => false,
        };
        let volatility_expanded = match (state.atr, state.atr_avg) {
            (Some(atr), Some(avg)) => atr > avg * cfg.atr_volatility_multiplier,
            _ => false,
        };

        Confirmations {
            mid_rising: mid_run(history, cfg.boll_mid_rising_periods, |now, before| now > before),
            mid_falling: mid_run(history, cfg.boll_mid_rising_periods, |now, before| now < before),
            volume_surge,
            volatility_expanded,
        }
    }
}

/// Whether `step(mid[t-i], mid[t-i-1])` holds for each of the last `periods` bars.
fn mid_run(history: &StateHistory, periods: usize, step: impl Fn(f64, f64) -> bool) -> bool {
    (0..periods).all(|i| {
        let now = history.ago(i).and_then(|s| s.boll_mid);
        let before = history.ago(i + 1).and_then(|s| s.boll_mid);
        matches!((now, before), (Some(a), Some(b)) if step(a, b))
    })
}
