//! Flat/Open position state machine with a single pending-order slot.
//!
//! ```text
//! Flat ──buy intent──▶ Flat+pending ──buy fill──▶ Open
//! Open ──sell intent─▶ Open+pending ──sell fill─▶ Flat
//! rejected / cancelled: pending cleared, position unchanged
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::exits::{stop_distance, trailing_multiplier, ExitLevels};
use super::ratchet::TrailingRatchet;
use super::sizing::{RiskSizer, SizeQuote};
use crate::config::RiskConfig;
use crate::domain::{
    AccountSnapshot, ExitReason, IntentReason, OrderIntent, OrderResult, OrderSide, OrderStatus,
    Position, PositionSnapshot, RiskCounters,
};
use crate::indicators::IndicatorState;
use crate::signals::ValidationResult;
use crate::trend::TrendLabel;

/// Latest fast-bar facts needed to book a fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillContext {
    pub bar_index: usize,
    pub date: NaiveDate,
    pub close: f64,
    pub atr: Option<f64>,
}

impl FillContext {
    pub fn from_state(state: &IndicatorState) -> Self {
        Self {
            bar_index: state.bar_index,
            date: state.bar.date(),
            close: state.close(),
            atr: state.atr,
        }
    }
}

/// What an order result did to the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultEffect {
    Opened,
    Closed,
    /// Rejected or cancelled; the position is unchanged.
    Cleared,
    StillPending,
    /// No matching pending order.
    Ignored,
}

/// The computed size fell below the minimum order size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryRejected {
    pub quote: SizeQuote,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PendingOrder {
    /// Entry trend is kept so the fill can scale the stop.
    Buy { trend: TrendLabel },
    Sell,
}

impl PendingOrder {
    fn side(self) -> OrderSide {
        match self {
            PendingOrder::Buy { .. } => OrderSide::Buy,
            PendingOrder::Sell => OrderSide::Sell,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RiskManager {
    config: RiskConfig,
    sizer: RiskSizer,
    position: Position,
    ratchet: TrailingRatchet,
    counters: RiskCounters,
    pending: Option<PendingOrder>,
    /// Fast bar index the pending intent was emitted on.
    pending_since: usize,
}

impl RiskManager {
    pub fn new(config: RiskConfig) -> Self {
        Self {
            sizer: RiskSizer::from_config(&config),
            config,
            position: Position::default(),
            ratchet: TrailingRatchet::new(),
            counters: RiskCounters::default(),
            pending: None,
            pending_since: 0,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn snapshot(&self) -> PositionSnapshot {
        self.position.snapshot()
    }

    pub fn counters(&self) -> &RiskCounters {
        &self.counters
    }

    pub fn has_pending_order(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.position.is_open
    }

    pub fn daily_cap_reached(&self, date: NaiveDate) -> bool {
        self.counters
            .daily_cap_reached(date, self.config.max_trades_per_day)
    }

    /// True while fewer than `min_hold_periods` fast bars have passed since entry.
    pub fn in_min_hold(&self, bar_index: usize) -> bool {
        self.position
            .bars_held(bar_index)
            .is_some_and(|held| held < self.config.min_hold_periods)
    }

    /// Size a validated buy and, if large enough, emit it and mark it pending.
    pub fn propose_entry(
        &mut self,
        state: &IndicatorState,
        prev_atr: Option<f64>,
        trend: TrendLabel,
        validation: &ValidationResult,
        account: &AccountSnapshot,
    ) -> Result<OrderIntent, EntryRejected> {
        let distance = state
            .atr
            .filter(|atr| *atr > 0.0)
            .map(|atr| stop_distance(&self.config, atr, trend));
        let quote = self
            .sizer
            .quote(account, state.close(), distance, state.atr, prev_atr);
        if !self.sizer.meets_minimum(&quote) {
            return Err(EntryRejected { quote });
        }

        self.pending = Some(PendingOrder::Buy { trend });
        self.pending_since = state.bar_index;
        Ok(OrderIntent {
            side: OrderSide::Buy,
            size: quote.size,
            reason: IntentReason::Entry {
                trend,
                passed_criteria: validation.passed_names(),
            },
            triggering_indicators: state.ready_values(),
        })
    }

    /// Ratchet the trailing stop toward `close - multiplier(trend) * ATR`.
    pub fn update_trailing(&mut self, state: &IndicatorState, trend: TrendLabel) -> Option<f64> {
        if !self.position.is_open {
            return None;
        }
        if let Some(atr) = state.atr {
            let candidate = state.close() - trailing_multiplier(&self.config, trend) * atr;
            self.position.trailing_stop = Some(self.ratchet.apply(candidate));
        }
        self.position.trailing_stop
    }

    /// Emit a sell for the whole position and mark it pending.
    pub fn propose_exit(&mut self, reason: ExitReason, state: &IndicatorState) -> OrderIntent {
        self.pending = Some(PendingOrder::Sell);
        self.pending_since = state.bar_index;

        let mut indicators = state.ready_values();
        for (name, level) in [
            ("stop_loss", self.position.stop_loss),
            ("take_profit", self.position.take_profit),
            ("trailing_stop", self.position.trailing_stop),
        ] {
            if let Some(level) = level {
                indicators.insert(name.to_string(), level);
            }
        }
        OrderIntent {
            side: OrderSide::Sell,
            size: self.position.entry_size.unwrap_or(0.0),
            reason: IntentReason::Exit { reason },
            triggering_indicators: indicators,
        }
    }

    /// Drop a pending order that has waited more than
    /// `pending_order_timeout_bars` fast bars without a result. The position is
    /// left as it was, exactly as for a rejection. Returns the dropped side.
    pub fn expire_pending(&mut self, bar_index: usize) -> Option<OrderSide> {
        let pending = self.pending?;
        let waited = bar_index.saturating_sub(self.pending_since);
        if waited <= self.config.pending_order_timeout_bars {
            return None;
        }
        self.pending = None;
        Some(pending.side())
    }

    /// Apply an execution report for the pending order.
    pub fn on_order_result(&mut self, result: &OrderResult, ctx: FillContext) -> ResultEffect {
        let Some(pending) = self.pending else {
            return ResultEffect::Ignored;
        };
        if pending.side() != result.side {
            return ResultEffect::Ignored;
        }

        match result.status {
            OrderStatus::Submitted => ResultEffect::StillPending,
            OrderStatus::Rejected | OrderStatus::Cancelled => {
                self.pending = None;
                ResultEffect::Cleared
            }
            OrderStatus::Filled => {
                self.pending = None;
                let price = result.filled_price.unwrap_or(ctx.close);
                let size = result.filled_size.unwrap_or(result.requested_size);
                match pending {
                    PendingOrder::Buy { trend } => {
                        self.open(price, size, trend, ctx);
                        ResultEffect::Opened
                    }
                    PendingOrder::Sell => {
                        self.close();
                        ResultEffect::Closed
                    }
                }
            }
        }
    }

    fn open(&mut self, price: f64, size: f64, trend: TrendLabel, ctx: FillContext) {
        let levels = ExitLevels::at_entry(&self.config, price, ctx.atr, trend);
        self.ratchet = TrailingRatchet::with_initial_level(levels.trailing_stop);
        self.position = Position {
            is_open: true,
            entry_price: Some(price),
            entry_size: Some(size),
            entry_bar_index: Some(ctx.bar_index),
            stop_loss: Some(levels.stop_loss),
            take_profit: Some(levels.take_profit),
            trailing_stop: Some(levels.trailing_stop),
        };
        self.counters.record_entry(ctx.date);
    }

    fn close(&mut self) {
        self.position = Position::default();
        self.ratchet.reset();
    }
}
