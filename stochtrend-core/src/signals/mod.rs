//! Fast-timeframe signal validation.
//!
//! The validator scores a Stochastic-RSI crossover against a checklist of
//! confirming conditions; the entry gate adds trend-dependent preconditions
//! in front of the buy checklist.

pub mod gate;
pub mod validator;

pub use gate::{EntryGate, GateRule};
pub use validator::{Criterion, CriterionOutcome, SignalValidator, ValidationResult};
