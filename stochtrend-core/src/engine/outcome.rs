//! What the engine decided on a bar, and why it may have decided nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::{BarError, OrderIntent, Timeframe};
use crate::indicators::NotReady;
use crate::position_management::ExitSignals;
use crate::signals::{GateRule, ValidationResult};
use crate::trend::TrendLabel;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Bar(#[from] BarError),
}

/// Reason no intent was emitted on a fast bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Suppression {
    NotReady { indicator: String },
    OrderPending,
    DailyCapReached,
    EntryGateClosed { rule: GateRule },
    SignalNotValidated,
    SizeBelowMinimum { size: f64 },
    MinHoldActive,
    Holding,
}

impl From<NotReady> for Suppression {
    fn from(err: NotReady) -> Self {
        Suppression::NotReady {
            indicator: err.0.to_string(),
        }
    }
}

impl fmt::Display for Suppression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suppression::NotReady { indicator } => write!(f, "not ready: {indicator}"),
            Suppression::OrderPending => f.write_str("order pending"),
            Suppression::DailyCapReached => f.write_str("daily trade cap reached"),
            Suppression::EntryGateClosed { rule } => write!(f, "entry gate closed ({rule})"),
            Suppression::SignalNotValidated => f.write_str("signal not validated"),
            Suppression::SizeBelowMinimum { size } => write!(f, "size {size} below minimum"),
            Suppression::MinHoldActive => f.write_str("minimum hold active"),
            Suppression::Holding => f.write_str("holding"),
        }
    }
}

/// Result of feeding one bar to the engine.
///
/// Slow bars only report that they were queued; every decision field is
/// filled on fast bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarOutcome {
    pub timeframe: Timeframe,
    pub bar_index: usize,
    pub timestamp: DateTime<Utc>,
    pub trend: TrendLabel,
    pub intent: Option<OrderIntent>,
    pub suppression: Option<Suppression>,
    pub buy_validation: Option<ValidationResult>,
    pub sell_validation: Option<ValidationResult>,
    pub exit_signals: Option<ExitSignals>,
}

impl BarOutcome {
    pub(crate) fn new(
        timeframe: Timeframe,
        bar_index: usize,
        timestamp: DateTime<Utc>,
        trend: TrendLabel,
    ) -> Self {
        Self {
            timeframe,
            bar_index,
            timestamp,
            trend,
            intent: None,
            suppression: None,
            buy_validation: None,
            sell_validation: None,
            exit_signals: None,
        }
    }

    pub(crate) fn suppressed(mut self, reason: impl Into<Suppression>) -> Self {
        self.suppression = Some(reason.into());
        self
    }

    pub(crate) fn with_intent(mut self, intent: OrderIntent) -> Self {
        self.intent = Some(intent);
        self
    }
}
