//! Incremental reveal engine
//!
//! - `session.rs` - RevelationSession: cursors and the revealed prefix
//! - `scheduler.rs` - RevelationScheduler: Idle/Running/Stopped/Completed state machine
//! - `wasm.rs` - TypingEngine: JS binding with callback observers

pub mod scheduler;
pub mod session;
pub mod wasm;

pub use scheduler::*;
pub use session::*;
