//! Protective levels and the exit priority ladder.

use serde::{Deserialize, Serialize};

use crate::config::RiskConfig;
use crate::domain::{ExitReason, Position};
use crate::indicators::IndicatorState;
use crate::trend::TrendLabel;

/// Stop-distance scale for the entry trend. 1.0 unless trend scaling is on.
pub fn trend_stop_scale(config: &RiskConfig, trend: TrendLabel) -> f64 {
    if !config.trend_scaled_stops {
        return 1.0;
    }
    match trend {
        TrendLabel::Bullish => config.bullish_stop_scale,
        TrendLabel::Sideways => 1.0,
        TrendLabel::Bearish => config.bearish_stop_scale,
    }
}

/// ATR multiple for the trailing stop in `trend`.
pub fn trailing_multiplier(config: &RiskConfig, trend: TrendLabel) -> f64 {
    match trend {
        TrendLabel::Bullish => config.trailing_stop_multiplier,
        TrendLabel::Sideways => config.sideways_trailing_multiplier,
        TrendLabel::Bearish => config.bearish_trailing_multiplier,
    }
}

/// Distance from entry to the initial stop.
pub fn stop_distance(config: &RiskConfig, atr: f64, trend: TrendLabel) -> f64 {
    config.stop_loss_multiplier * atr * trend_stop_scale(config, trend)
}

/// Levels set when a buy fills.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
    pub trailing_stop: f64,
}

impl ExitLevels {
    /// Levels for a fill at `entry_price`.
    ///
    /// Without a positive ATR the unit distance becomes
    /// `entry * max_loss_per_trade / stop_loss_multiplier`, so the stop sits
    /// exactly `max_loss_per_trade` below entry and the other levels keep
    /// their ratio to it.
    pub fn at_entry(
        config: &RiskConfig,
        entry_price: f64,
        atr: Option<f64>,
        trend: TrendLabel,
    ) -> Self {
        let unit = atr
            .filter(|a| a.is_finite() && *a > 0.0)
            .unwrap_or(entry_price * config.max_loss_per_trade / config.stop_loss_multiplier);

        let mut stop_loss = entry_price - stop_distance(config, unit, trend);
        if let Some(pct) = config.hard_stop_pct {
            stop_loss = stop_loss.max(entry_price * (1.0 - pct));
        }
        Self {
            stop_loss,
            take_profit: entry_price + config.take_profit_multiplier * unit,
            trailing_stop: entry_price - config.trailing_stop_multiplier * unit,
        }
    }
}

/// Every exit condition for one bar, evaluated independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitSignals {
    pub overbought_reversal: bool,
    pub trend_break: bool,
    pub volatility_breakout: bool,
    pub hard_stop: bool,
    pub trailing_stop: bool,
    pub take_profit: bool,
}

impl ExitSignals {
    /// Evaluate against an open position whose trailing stop is already updated.
    ///
    /// Conditions whose indicator is still warming up evaluate to false.
    pub fn evaluate(
        config: &RiskConfig,
        position: &Position,
        state: &IndicatorState,
        prev: Option<&IndicatorState>,
        overbought_reversal: bool,
    ) -> Self {
        let close = state.close();
        let below_slow = |s: &IndicatorState| s.slow_ma.is_some_and(|ma| s.close() < ma);
        Self {
            overbought_reversal,
            trend_break: below_slow(state) && prev.is_some_and(below_slow),
            volatility_breakout: state
                .atr
                .is_some_and(|atr| state.bar.range() > config.volatility_breakout_multiplier * atr),
            hard_stop: position.stop_loss.is_some_and(|sl| close <= sl),
            trailing_stop: position.trailing_stop.is_some_and(|ts| close <= ts),
            take_profit: position.take_profit.is_some_and(|tp| close >= tp),
        }
    }

    /// Highest-priority exit that fired.
    pub fn first(&self) -> Option<ExitReason> {
        [
            (self.overbought_reversal, ExitReason::OverboughtReversal),
            (self.trend_break, ExitReason::TrendBreak),
            (self.volatility_breakout, ExitReason::VolatilityBreakout),
            (self.hard_stop, ExitReason::HardStop),
            (self.trailing_stop, ExitReason::TrailingStop),
            (self.take_profit, ExitReason::TakeProfit),
        ]
        .into_iter()
        .find_map(|(fired, reason)| fired.then_some(reason))
    }
}
