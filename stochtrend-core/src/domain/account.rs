//! Equity and cash as seen by the sizing rules.

use serde::{Deserialize, Serialize};

/// Point-in-time account values supplied by the broker collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub total_equity: f64,
    pub available_cash: f64,
}

impl AccountSnapshot {
    pub fn new(total_equity: f64, available_cash: f64) -> Self {
        Self {
            total_equity,
            available_cash,
        }
    }
}

/// Accessor for the current account state.
///
/// The engine reads it once per fast bar and only when it is about to size an
/// entry. It never writes to it.
pub trait Account {
    fn snapshot(&self) -> AccountSnapshot;
}

impl Account for AccountSnapshot {
    fn snapshot(&self) -> AccountSnapshot {
        *self
    }
}
