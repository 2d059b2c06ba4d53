use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The single long position and its protective levels.
///
/// `Position::default()` is the flat state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub is_open: bool,
    pub entry_price: Option<f64>,
    pub entry_size: Option<f64>,
    pub entry_bar_index: Option<usize>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub trailing_stop: Option<f64>,
}

impl Position {
    /// Number of fast bars since the entry fill, if open.
    pub fn bars_held(&self, bar_index: usize) -> Option<usize> {
        self.entry_bar_index
            .filter(|_| self.is_open)
            .map(|entry| bar_index.saturating_sub(entry))
    }

    pub fn snapshot(&self) -> PositionSnapshot {
        PositionSnapshot {
            is_open: self.is_open,
            entry_price: self.entry_price,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            trailing_stop: self.trailing_stop,
            entry_bar_index: self.entry_bar_index,
        }
    }
}

/// Read-only view of the position for logging and analytics collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub is_open: bool,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub trailing_stop: Option<f64>,
    pub entry_bar_index: Option<usize>,
}

/// Trade-frequency counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounters {
    pub last_trade_date: Option<NaiveDate>,
    pub daily_trade_count: u32,
    pub total_trade_count: u32,
}

impl RiskCounters {
    /// Record a confirmed entry on `date`.
    pub fn record_entry(&mut self, date: NaiveDate) {
        if self.last_trade_date == Some(date) {
            self.daily_trade_count += 1;
        } else {
            self.daily_trade_count = 1;
            self.last_trade_date = Some(date);
        }
        self.total_trade_count += 1;
    }

    /// True when no further entries are allowed on `date`.
    pub fn daily_cap_reached(&self, date: NaiveDate, max_trades_per_day: u32) -> bool {
        self.last_trade_date == Some(date) && self.daily_trade_count >= max_trades_per_day
    }
}
