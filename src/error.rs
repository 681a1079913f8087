//! Error types
//!
//! The text passes (normalize / sanitize / scan) are total and have no error
//! type. Everything that can go wrong lives at the session and turn layers.

use thiserror::Error;

/// Errors raised by the revelation scheduler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RevealError {
    /// `start()` was called while a session is still running
    #[error("a reveal session is already running; stop it first")]
    SessionActive,
}

/// Errors raised by a grading gateway implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),
    #[error("grading endpoint returned {code} {reason}")]
    Status { code: u16, reason: String },
    #[error("grading endpoint returned no content")]
    EmptyResponse,
    #[error("javascript gateway failed: {0}")]
    Js(String),
}

/// Errors raised while orchestrating a chat turn
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("nothing to submit: input is empty and no files are attached")]
    EmptySubmission,
    #[error("too many attachments: at most {max} allowed, got {got}")]
    TooManyAttachments { max: usize, got: usize },
    #[error("a turn is already waiting for a response")]
    TurnInProgress,
    #[error("no turn is waiting for a response")]
    NoPendingTurn,
    #[error(transparent)]
    Reveal(#[from] RevealError),
}
