//! Order intents emitted by the engine and order results reported back to it.
//!
//! The engine never executes anything. It emits an [`OrderIntent`], the
//! execution collaborator acts on it and reports an [`OrderResult`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::trend::TrendLabel;

/// Buy opens the long position, Sell closes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Why an exit fired, in evaluation priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Stochastic-RSI overbought and the sell checklist validated.
    OverboughtReversal,
    /// Close below the slow MA on two consecutive bars.
    TrendBreak,
    /// Bar range wider than the volatility-breakout multiple of ATR.
    VolatilityBreakout,
    HardStop,
    TrailingStop,
    TakeProfit,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::OverboughtReversal => "overbought+validated",
            ExitReason::TrendBreak => "trend break",
            ExitReason::VolatilityBreakout => "volatility breakout",
            ExitReason::HardStop => "hard stop",
            ExitReason::TrailingStop => "trailing stop",
            ExitReason::TakeProfit => "take profit",
        };
        f.write_str(s)
    }
}

/// Diagnostic reason attached to an intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntentReason {
    /// Validated buy: the trend it was taken in and the checklist items that passed.
    Entry {
        trend: TrendLabel,
        passed_criteria: Vec<String>,
    },
    Exit { reason: ExitReason },
}

impl fmt::Display for IntentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntentReason::Entry {
                trend,
                passed_criteria,
            } => write!(f, "entry in {trend} trend [{}]", passed_criteria.join(", ")),
            IntentReason::Exit { reason } => write!(f, "exit: {reason}"),
        }
    }
}

/// An order request for the execution collaborator.
///
/// `triggering_indicators` is a snapshot of the indicator values the decision
/// was made on. `BTreeMap` keeps serialization order deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub side: OrderSide,
    pub size: f64,
    pub reason: IntentReason,
    pub triggering_indicators: BTreeMap<String, f64>,
}

impl OrderIntent {
    pub fn is_entry(&self) -> bool {
        self.side == OrderSide::Buy
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        match &self.reason {
            IntentReason::Exit { reason } => Some(*reason),
            IntentReason::Entry { .. } => None,
        }
    }
}

/// Lifecycle states an execution collaborator can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Submitted,
    Filled,
    Rejected,
    Cancelled,
}

impl OrderStatus {
    /// Whether the order is finished, one way or the other.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Submitted)
    }
}

/// Fill or rejection notification for a previously emitted intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    pub side: OrderSide,
    pub requested_size: f64,
    pub filled_price: Option<f64>,
    pub filled_size: Option<f64>,
    pub status: OrderStatus,
}

impl OrderResult {
    pub fn filled(side: OrderSide, size: f64, price: f64) -> Self {
        Self {
            side,
            requested_size: size,
            filled_price: Some(price),
            filled_size: Some(size),
            status: OrderStatus::Filled,
        }
    }

    pub fn rejected(side: OrderSide, size: f64) -> Self {
        Self {
            side,
            requested_size: size,
            filled_price: None,
            filled_size: None,
            status: OrderStatus::Rejected,
        }
    }

    pub fn cancelled(side: OrderSide, size: f64) -> Self {
        Self {
            status: OrderStatus::Cancelled,
            ..Self::rejected(side, size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_reason_labels() {
        assert_eq!(ExitReason::HardStop.to_string(), "hard stop");
        assert_eq!(
            ExitReason::OverboughtReversal.to_string(),
            "overbought+validated"
        );
    }

    #[test]
    fn order_status_terminal() {
        assert!(!OrderStatus::Submitted.is_terminal());
        assert!(OrderStatus::Filled.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn intent_reason_serializes_tagged() {
        let reason = IntentReason::Exit {
            reason: ExitReason::TakeProfit,
        };
        let json = serde_json::to_string(&reason).unwrap();
        assert_eq!(json, r#"{"kind":"exit","reason":"take_profit"}"#);
    }

    #[test]
    fn filled_result_carries_price_and_size() {
        let result = OrderResult::filled(OrderSide::Buy, 1.5, 101.0);
        assert_eq!(result.filled_price, Some(101.0));
        assert_eq!(result.filled_size, Some(1.5));
        assert_eq!(OrderResult::cancelled(OrderSide::Sell, 1.0).status, OrderStatus::Cancelled);
    }
}
