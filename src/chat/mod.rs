//! Chat turn layer
//!
//! - `message.rs` - Message / Role / FileRef, legacy row expansion, session titles
//! - `store.rs` - ConversationStore boundary and the in-memory MemoryStore
//! - `gateway.rs` - GradingGateway boundary, context builder, fallback handling
//! - `controller.rs` - ChatController: one session's turn sequencing
//! - `wasm.rs` - TutorChat / JsGateway bindings

pub mod controller;
pub mod gateway;
pub mod message;
pub mod store;
pub mod wasm;

pub use controller::*;
pub use gateway::*;
pub use message::*;
pub use store::*;

#[cfg(test)]
mod tests;
