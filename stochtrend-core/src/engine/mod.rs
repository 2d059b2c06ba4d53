//! Bar-by-bar decision engine.
//!
//! Per fast bar:
//! 1. Drain queued slow bars that closed at or before the fast bar and
//!    reclassify the trend after each one
//! 2. Advance the fast indicator pipeline
//! 3. Flat: daily cap → entry gate → buy checklist → sizing
//!    Open: min-hold hard stop, or trailing update → exit ladder
//!
//! The engine emits order intents and never executes them; fills come back
//! through [`Engine::on_order_result`].

pub mod alignment;
pub mod decision;
pub mod outcome;

pub use alignment::SlowBarQueue;
pub use decision::Engine;
pub use outcome::{BarOutcome, EngineError, Suppression};
