//! Position and risk management.
//!
//! - [`TrailingRatchet`]: trailing stop that only ever rises
//! - [`RiskSizer`]: equity-risk sizing capped by available cash
//! - [`exits`]: initial stop/target levels and the exit priority ladder
//! - [`RiskManager`]: the Flat/Open state machine with its pending-order flag

pub mod exits;
pub mod manager;
pub mod ratchet;
pub mod sizing;

pub use exits::{ExitLevels, ExitSignals};
pub use manager::{EntryRejected, FillContext, ResultEffect, RiskManager};
pub use ratchet::TrailingRatchet;
pub use sizing::{RiskSizer, SizeQuote};
