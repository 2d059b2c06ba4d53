//! Paper account that fills every intent synchronously at the bar close.

use stochtrend_core::domain::{Account, AccountSnapshot, OrderIntent, OrderResult, OrderSide};

#[derive(Debug, Clone)]
pub struct PaperAccount {
    cash: f64,
    units: f64,
    mark: f64,
}

impl PaperAccount {
    pub fn new(cash: f64) -> Self {
        Self {
            cash,
            units: 0.0,
            mark: 0.0,
        }
    }

    /// Revalue the held units at `close`.
    pub fn mark(&mut self, close: f64) {
        self.mark = close;
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn units(&self) -> f64 {
        self.units
    }

    /// Execute `intent` at `price`. A buy the cash cannot cover is rejected.
    pub fn execute(&mut self, intent: &OrderIntent, price: f64) -> OrderResult {
        match intent.side {
            OrderSide::Buy => {
                let cost = intent.size * price;
                if cost > self.cash {
                    return OrderResult::rejected(OrderSide::Buy, intent.size);
                }
                self.cash -= cost;
                self.units += intent.size;
                OrderResult::filled(OrderSide::Buy, intent.size, price)
            }
            OrderSide::Sell => {
                let size = intent.size.min(self.units);
                self.cash += size * price;
                self.units -= size;
                OrderResult::filled(OrderSide::Sell, size, price)
            }
        }
    }
}

impl Account for PaperAccount {
    fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot::new(self.cash + self.units * self.mark, self.cash)
    }
}
