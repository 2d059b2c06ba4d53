//! Domain types shared by every stage of the engine.

pub mod account;
pub mod bar;
pub mod order;
pub mod position;

pub use account::{Account, AccountSnapshot};
pub use bar::{check_sequence, Bar, BarError, Timeframe};
pub use order::{ExitReason, IntentReason, OrderIntent, OrderResult, OrderSide, OrderStatus};
pub use position::{Position, PositionSnapshot, RiskCounters};
