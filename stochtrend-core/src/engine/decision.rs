//! The `Engine`: owns both pipelines, the classifier, the validator and the
//! risk manager, and sequences them once per bar.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::alignment::SlowBarQueue;
use super::outcome::{BarOutcome, EngineError, Suppression};
use crate::config::{ConfigError, StrategyConfig};
use crate::domain::{
    check_sequence, Account, Bar, ExitReason, OrderResult, PositionSnapshot, RiskCounters,
    Timeframe,
};
use crate::indicators::{IndicatorPipeline, IndicatorState};
use crate::position_management::{ExitSignals, FillContext, ResultEffect, RiskManager};
use crate::signals::{EntryGate, SignalValidator};
use crate::trend::{TrendClassification, TrendClassifier, TrendLabel};

#[derive(Debug, Clone)]
pub struct Engine {
    config: StrategyConfig,
    slow: IndicatorPipeline,
    fast: IndicatorPipeline,
    slow_queue: SlowBarQueue,
    last_fast: Option<DateTime<Utc>>,
    classifier: TrendClassifier,
    trend: TrendLabel,
    classification: Option<TrendClassification>,
    validator: SignalValidator,
    gate: EntryGate,
    risk: RiskManager,
}

impl Engine {
    /// Validate `config` and build a flat engine with empty pipelines.
    pub fn new(config: StrategyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            slow: IndicatorPipeline::new(&config.indicators),
            fast: IndicatorPipeline::new(&config.indicators),
            slow_queue: SlowBarQueue::new(),
            last_fast: None,
            classifier: TrendClassifier::new(config.trend.clone()),
            trend: TrendLabel::Sideways,
            classification: None,
            validator: SignalValidator::new(config.signals.clone()),
            gate: EntryGate::new(config.signals.entry_gate.clone()),
            risk: RiskManager::new(config.risk.clone()),
            config,
        })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Feed one closed bar. Refused bars leave the engine untouched.
    pub fn on_bar(
        &mut self,
        timeframe: Timeframe,
        bar: Bar,
        account: &impl Account,
    ) -> Result<BarOutcome, EngineError> {
        match timeframe {
            Timeframe::Slow => {
                let timestamp = bar.timestamp;
                let index = self.slow_queue.push(bar)?;
                Ok(BarOutcome::new(Timeframe::Slow, index, timestamp, self.trend))
            }
            Timeframe::Fast => {
                check_sequence(Timeframe::Fast, self.last_fast, &bar)?;
                self.last_fast = Some(bar.timestamp);
                self.advance_slow(bar.timestamp);

                let state = self.fast.update(&bar);
                let prev = self.fast.previous().cloned();
                let outcome = self.decide(&state, prev.as_ref(), account);
                match (&outcome.intent, &outcome.suppression) {
                    (Some(intent), _) => info!(
                        bar_index = state.bar_index,
                        side = ?intent.side,
                        size = intent.size,
                        reason = %intent.reason,
                        "order intent"
                    ),
                    (None, Some(why)) => debug!(
                        bar_index = state.bar_index,
                        trend = %self.trend,
                        suppression = %why,
                        "no decision"
                    ),
                    (None, None) => {}
                }
                Ok(outcome)
            }
        }
    }

    /// Apply an execution report for the outstanding intent.
    pub fn on_order_result(&mut self, result: &OrderResult) -> ResultEffect {
        let Some(latest) = self.fast.latest() else {
            warn!(side = ?result.side, status = ?result.status, "order result before any fast bar");
            return ResultEffect::Ignored;
        };
        let effect = self
            .risk
            .on_order_result(result, FillContext::from_state(latest));
        match effect {
            ResultEffect::Opened | ResultEffect::Closed => info!(
                side = ?result.side,
                price = ?result.filled_price,
                size = ?result.filled_size,
                effect = ?effect,
                "fill applied"
            ),
            ResultEffect::Cleared => info!(
                side = ?result.side,
                status = ?result.status,
                "order not filled, pending cleared"
            ),
            ResultEffect::StillPending => debug!(side = ?result.side, "order still pending"),
            ResultEffect::Ignored => warn!(
                side = ?result.side,
                status = ?result.status,
                "order result with no matching pending order"
            ),
        }
        effect
    }

    pub fn snapshot(&self) -> PositionSnapshot {
        self.risk.snapshot()
    }

    pub fn counters(&self) -> &RiskCounters {
        self.risk.counters()
    }

    pub fn trend(&self) -> TrendLabel {
        self.trend
    }

    /// Classification of the most recent slow bar, once the slow side is warm.
    pub fn classification(&self) -> Option<&TrendClassification> {
        self.classification.as_ref()
    }

    pub fn has_pending_order(&self) -> bool {
        self.risk.has_pending_order()
    }

    /// Latest fast-timeframe indicator state.
    pub fn fast_state(&self) -> Option<&IndicatorState> {
        self.fast.latest()
    }

    /// Latest slow-timeframe indicator state visible to fast decisions.
    pub fn slow_state(&self) -> Option<&IndicatorState> {
        self.slow.latest()
    }

    fn advance_slow(&mut self, until: DateTime<Utc>) {
        for bar in self.slow_queue.drain_until(until) {
            let state = self.slow.update(&bar);
            match self.classifier.classify(&state, self.slow.history()) {
                Ok(c) => {
                    if c.label != self.trend {
                        info!(from = %self.trend, to = %c.label, adx = c.adx, "trend change");
                    }
                    self.trend = c.label;
                    self.classification = Some(c);
                }
                Err(not_ready) => {
                    debug!(slow_index = state.bar_index, %not_ready, "trend not classified");
                    self.trend = TrendLabel::Sideways;
                    self.classification = None;
                }
            }
        }
    }

    fn decide(
        &mut self,
        state: &IndicatorState,
        prev: Option<&IndicatorState>,
        account: &impl Account,
    ) -> BarOutcome {
        let outcome = BarOutcome::new(
            Timeframe::Fast,
            state.bar_index,
            state.bar.timestamp,
            self.trend,
        );
        if let Some(side) = self.risk.expire_pending(state.bar_index) {
            warn!(
                bar_index = state.bar_index,
                side = ?side,
                "no result for pending order, treating it as rejected"
            );
        }
        if self.risk.has_pending_order() {
            return outcome.suppressed(Suppression::OrderPending);
        }
        if self.risk.is_open() {
            self.decide_exit(state, prev, outcome)
        } else {
            self.decide_entry(state, prev, account, outcome)
        }
    }

    fn decide_entry(
        &mut self,
        state: &IndicatorState,
        prev: Option<&IndicatorState>,
        account: &impl Account,
        mut outcome: BarOutcome,
    ) -> BarOutcome {
        if self.classification.is_none() {
            return outcome.suppressed(Suppression::NotReady {
                indicator: "trend".into(),
            });
        }
        if self.risk.daily_cap_reached(state.bar.date()) {
            return outcome.suppressed(Suppression::DailyCapReached);
        }
        let Some(prev) = prev else {
            return outcome.suppressed(Suppression::NotReady {
                indicator: "stoch_k".into(),
            });
        };
        match self.gate.check(state, self.trend) {
            Ok(None) => {}
            Ok(Some(rule)) => return outcome.suppressed(Suppression::EntryGateClosed { rule }),
            Err(not_ready) => return outcome.suppressed(not_ready),
        }

        let validation = match self.validator.validate_buy(state, prev, self.trend) {
            Ok(v) => v,
            Err(not_ready) => return outcome.suppressed(not_ready),
        };
        if !validation.is_valid {
            outcome.buy_validation = Some(validation);
            return outcome.suppressed(Suppression::SignalNotValidated);
        }

        let proposal =
            self.risk
                .propose_entry(state, prev.atr, self.trend, &validation, &account.snapshot());
        outcome.buy_validation = Some(validation);
        match proposal {
            Ok(intent) => outcome.with_intent(intent),
            Err(rejected) => outcome.suppressed(Suppression::SizeBelowMinimum {
                size: rejected.quote.size,
            }),
        }
    }

    fn decide_exit(
        &mut self,
        state: &IndicatorState,
        prev: Option<&IndicatorState>,
        mut outcome: BarOutcome,
    ) -> BarOutcome {
        if self.risk.in_min_hold(state.bar_index) {
            let hit = self
                .risk
                .position()
                .stop_loss
                .is_some_and(|sl| state.close() <= sl);
            if hit {
                let signals = ExitSignals {
                    hard_stop: true,
                    ..ExitSignals::default()
                };
                outcome.exit_signals = Some(signals);
                return self.exit(ExitReason::HardStop, state, outcome);
            }
            return outcome.suppressed(Suppression::MinHoldActive);
        }

        self.risk.update_trailing(state, self.trend);

        let overbought = state
            .stoch_k
            .is_some_and(|k| k > self.validator.config().overbought);
        let mut overbought_reversal = false;
        if overbought {
            if let Some(prev) = prev {
                // sell checklist still warming up: no reversal exit
                if let Ok(sell) = self.validator.validate_sell(state, prev) {
                    overbought_reversal = sell.is_valid;
                    outcome.sell_validation = Some(sell);
                }
            }
        }

        let signals = ExitSignals::evaluate(
            &self.config.risk,
            self.risk.position(),
            state,
            prev,
            overbought_reversal,
        );
        outcome.exit_signals = Some(signals);
        match signals.first() {
            Some(reason) => self.exit(reason, state, outcome),
            None => outcome.suppressed(Suppression::Holding),
        }
    }

    fn exit(&mut self, reason: ExitReason, state: &IndicatorState, outcome: BarOutcome) -> BarOutcome {
        let intent = self.risk.propose_exit(reason, state);
        outcome.with_intent(intent)
    }
}
