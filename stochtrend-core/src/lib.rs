//! StochTrend Core: multi-timeframe Stochastic-RSI trading-decision engine.
//!
//! This crate turns two closed-bar streams into long-only order intents:
//! - Domain types (bars, order intents and results, position, counters)
//! - Streaming indicator pipeline with bounded state history
//! - Slow-timeframe trend classifier (DMI/ADX + Bollinger + confirmations)
//! - Fast-timeframe buy/sell checklists and the trend-dependent entry gate
//! - Position and risk management with a ratcheting trailing stop
//! - The `Engine` façade that sequences all of the above bar by bar
//!
//! The engine never executes orders or touches cash; an execution
//! collaborator reports fills back through `Engine::on_order_result`.

pub mod config;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod indicators;
pub mod position_management;
pub mod signals;
pub mod trend;

pub use config::{ConfigError, StrategyConfig};
pub use engine::{BarOutcome, Engine, EngineError, Suppression};
