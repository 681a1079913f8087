//! TutorCore: Structure-Aware Typing Engine for the Tutor Chat Client
//!
//! A Rust/WASM implementation of the chat client's response reveal pipeline.
//!
//! # Architecture
//!
//! ## Markdown Passes (pure)
//! - `normalize.rs` - TextNormalizer: blank-line collapsing, section regrouping
//! - `sanitize.rs` - MarkdownSanitizer: malformed table / emphasis repair
//! - `structure.rs` - StructureScanner: line categories and reveal units
//!
//! ## Reveal Engine
//! - `session.rs` - RevelationSession: cursors and revealed prefix
//! - `scheduler.rs` - RevelationScheduler: tick-driven typing state machine
//!
//! ## Chat Turns
//! - `message.rs` / `store.rs` / `gateway.rs` - message model and collaborator boundaries
//! - `controller.rs` - ChatController: stop → record → grade → reveal → commit
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { TutorChat } from 'tutorcore';
//!
//! await init();
//!
//! const chat = new TutorChat(sessionId, storedMessages);
//! const context = chat.beginTurn("Grade my essay", [{ name: "essay.pdf", mime_hint: "application/pdf", byte_size: 1024 }], extracted);
//! chat.receiveResponse(await grade(context));
//!
//! // Tables and code blocks appear whole, prose types out grapheme by grapheme
//! const timer = setInterval(() => {
//!   const tick = chat.tick();
//!   if (tick.kind === "frame") render(tick.text);
//!   if (tick.kind === "done") clearInterval(timer);
//! }, chat.frameIntervalMs());
//!
//! // Stop button: keeps what is already on screen
//! chat.stop();
//! ```

pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod markdown;
pub mod reveal;

// Public exports
pub use chat::{ChatController, ConversationStore, FileRef, GradingGateway, MemoryStore, Message, Role};
pub use config::TutorConfig;
pub use error::{ChatError, GatewayError, RevealError};
pub use markdown::{normalize, sanitize, scan, Category, RevealUnit, StructuralLine, UnitKind};
pub use reveal::{Finish, Frame, RevealObserver, RevealStatus, RevelationScheduler, StopOutcome, Tick};

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

/// Change the console log level ("error", "warn", "info", "debug", "trace", "off")
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) {
    logging::init(logging::parse_level(level));
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("tutorcore v{}", env!("CARGO_PKG_VERSION"))
}
