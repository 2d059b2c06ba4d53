//! Multi-criterion buy/sell checklists.
//!
//! The %K/%D crossover is both mandatory and counted: a signal is valid only
//! when the crossover happened AND enough checklist items (crossover included)
//! passed for the current trend.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SignalConfig;
use crate::indicators::{require, IndicatorState, NotReady};
use crate::trend::TrendLabel;

/// One checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    StochCrossUp,
    CloseAboveFastMa,
    CloseAboveSlowMa,
    VolumeAboveAverage,
    MacdAboveSignal,
    CloseAboveLowerBand,
    RsiAboveFloor,
    StochCrossDown,
    CloseBelowFastMa,
    MacdBelowSignal,
    CloseBelowUpperBand,
    RsiBelowCeiling,
}

impl Criterion {
    pub fn name(self) -> &'static str {
        match self {
            Criterion::StochCrossUp => "stoch_cross_up",
            Criterion::CloseAboveFastMa => "close_above_fast_ma",
            Criterion::CloseAboveSlowMa => "close_above_slow_ma",
            Criterion::VolumeAboveAverage => "volume_above_average",
            Criterion::MacdAboveSignal => "macd_above_signal",
            Criterion::CloseAboveLowerBand => "close_above_lower_band",
            Criterion::RsiAboveFloor => "rsi_above_floor",
            Criterion::StochCrossDown => "stoch_cross_down",
            Criterion::CloseBelowFastMa => "close_below_fast_ma",
            Criterion::MacdBelowSignal => "macd_below_signal",
            Criterion::CloseBelowUpperBand => "close_below_upper_band",
            Criterion::RsiBelowCeiling => "rsi_below_ceiling",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionOutcome {
    pub criterion: Criterion,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub core_condition: bool,
    pub satisfied_count: usize,
    pub total_criteria: usize,
    pub required: usize,
    pub criteria: Vec<CriterionOutcome>,
}

impl ValidationResult {
    fn from_outcomes(criteria: Vec<CriterionOutcome>, required: usize) -> Self {
        let core_condition = criteria.first().is_some_and(|c| c.passed);
        let satisfied_count = criteria.iter().filter(|c| c.passed).count();
        Self {
            is_valid: core_condition && satisfied_count >= required,
            core_condition,
            satisfied_count,
            total_criteria: criteria.len(),
            required,
            criteria,
        }
    }

    /// Names of the checklist items that passed, in checklist order.
    pub fn passed_names(&self) -> Vec<String> {
        self.criteria
            .iter()
            .filter(|c| c.passed)
            .map(|c| c.criterion.name().to_string())
            .collect()
    }
}

fn outcome(criterion: Criterion, passed: bool) -> CriterionOutcome {
    CriterionOutcome { criterion, passed }
}

#[derive(Debug, Clone)]
pub struct SignalValidator {
    config: SignalConfig,
}

impl SignalValidator {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Required checklist count for a buy in `trend`.
    pub fn buy_required(&self, trend: TrendLabel) -> usize {
        match trend {
            TrendLabel::Bullish => self.config.bullish_required,
            TrendLabel::Sideways => self.config.sideways_required,
            TrendLabel::Bearish => self.config.bearish_required,
        }
    }

    pub fn validate_buy(
        &self,
        state: &IndicatorState,
        prev: &IndicatorState,
        trend: TrendLabel,
    ) -> Result<ValidationResult, NotReady> {
        let (k, d) = state.stoch()?;
        let (k_prev, d_prev) = prev.stoch()?;
        let close = state.close();
        let fast_ma = require(state.fast_ma, "fast_ma")?;
        let slow_ma = require(state.slow_ma, "slow_ma")?;
        let volume_ma = require(state.volume_ma_short, "volume_ma_short")?;
        let macd = require(state.macd, "macd")?;
        let macd_signal = require(state.macd_signal, "macd_signal")?;
        let lower = require(state.boll_lower, "boll_lower")?;
        let rsi = require(state.rsi, "rsi")?;

        let oversold = self.config.oversold;
        let from_oversold =
            !self.config.require_oversold_cross || (k < oversold && k_prev < oversold);

        let criteria = vec![
            outcome(Criterion::StochCrossUp, k > d && k_prev <= d_prev && from_oversold),
            outcome(Criterion::CloseAboveFastMa, close > fast_ma),
            outcome(Criterion::CloseAboveSlowMa, close > slow_ma),
            outcome(Criterion::VolumeAboveAverage, state.bar.volume > volume_ma),
            outcome(Criterion::MacdAboveSignal, macd > macd_signal),
            outcome(Criterion::CloseAboveLowerBand, close > lower),
            outcome(Criterion::RsiAboveFloor, rsi > self.config.buy_rsi_floor),
        ];
        Ok(ValidationResult::from_outcomes(
            criteria,
            self.buy_required(trend),
        ))
    }

    pub fn validate_sell(
        &self,
        state: &IndicatorState,
        prev: &IndicatorState,
    ) -> Result<ValidationResult, NotReady> {
        let (k, d) = state.stoch()?;
        let (k_prev, d_prev) = prev.stoch()?;
        let close = state.close();
        let fast_ma = require(state.fast_ma, "fast_ma")?;
        let macd = require(state.macd, "macd")?;
        let macd_signal = require(state.macd_signal, "macd_signal")?;
        let upper = require(state.boll_upper, "boll_upper")?;
        let rsi = require(state.rsi, "rsi")?;

        let criteria = vec![
            outcome(Criterion::StochCrossDown, k < d && k_prev >= d_prev),
            outcome(Criterion::CloseBelowFastMa, close < fast_ma),
            outcome(Criterion::MacdBelowSignal, macd < macd_signal),
            outcome(Criterion::CloseBelowUpperBand, close < upper),
            outcome(Criterion::RsiBelowCeiling, rsi < self.config.sell_rsi_ceiling),
        ];
        Ok(ValidationResult::from_outcomes(
            criteria,
            self.config.sell_required,
        ))
    }
}
