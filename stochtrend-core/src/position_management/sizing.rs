//! Risk-based position sizing.
//!
//! # Formula
//! ```text
//! risk_size = equity * max_loss_per_trade / stop_distance
//! cash_cap  = available_cash * cash_fraction / close
//! size      = min(risk_size, cash_cap)
//! ```
//!
//! When ATR has just jumped (ATR > prev ATR * high_volatility_ratio) the risk
//! size is scaled down by `high_volatility_size_factor`. Without a usable stop
//! distance the cash cap alone decides.

use serde::{Deserialize, Serialize};

use crate::config::RiskConfig;
use crate::domain::AccountSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeQuote {
    pub size: f64,
    /// `None` when no usable stop distance was available.
    pub risk_size: Option<f64>,
    pub cash_cap: f64,
    pub volatility_scaled: bool,
}

#[derive(Debug, Clone)]
pub struct RiskSizer {
    max_loss_per_trade: f64,
    cash_fraction: f64,
    min_order_size: f64,
    high_volatility_ratio: f64,
    high_volatility_size_factor: f64,
}

impl RiskSizer {
    pub fn from_config(config: &RiskConfig) -> Self {
        Self {
            max_loss_per_trade: config.max_loss_per_trade,
            cash_fraction: config.cash_fraction,
            min_order_size: config.min_order_size,
            high_volatility_ratio: config.high_volatility_ratio,
            high_volatility_size_factor: config.high_volatility_size_factor,
        }
    }

    /// Size an entry at `close`. Negative equity or cash count as zero.
    pub fn quote(
        &self,
        account: &AccountSnapshot,
        close: f64,
        stop_distance: Option<f64>,
        atr: Option<f64>,
        prev_atr: Option<f64>,
    ) -> SizeQuote {
        let equity = account.total_equity.max(0.0);
        let cash = account.available_cash.max(0.0);
        let cash_cap = if close > 0.0 {
            cash * self.cash_fraction / close
        } else {
            0.0
        };

        let volatility_scaled = match (atr, prev_atr) {
            (Some(now), Some(prev)) => prev > 0.0 && now > prev * self.high_volatility_ratio,
            _ => false,
        };
        let risk_size = stop_distance
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| {
                let raw = equity * self.max_loss_per_trade / d;
                if volatility_scaled {
                    raw * self.high_volatility_size_factor
                } else {
                    raw
                }
            });

        let size = match risk_size {
            Some(r) => r.min(cash_cap),
            None => cash_cap,
        };
        SizeQuote {
            size,
            risk_size,
            cash_cap,
            volatility_scaled,
        }
    }

    pub fn meets_minimum(&self, quote: &SizeQuote) -> bool {
        quote.size >= self.min_order_size
    }
}
