//! GradingGateway - the grader/LLM boundary
//!
//! A gateway turns one context string into one finished response. Network
//! failures, timeouts and non-2xx replies all come back as `GatewayError`;
//! the turn layer never retries and records the fixed fallback text instead.

use std::future::Future;

use super::message::{FileRef, Message};
use crate::error::GatewayError;

pub trait GradingGateway {
    fn submit(&self, context: &str) -> impl Future<Output = Result<String, GatewayError>>;
}

/// Build the grader context for one submission.
///
/// Layout: the user's text, the extracted file text (if any), the attached
/// file names (if any), then the last `window` turns of `history` as
/// `"<Role>: <content>"` lines.
pub fn build_context(
    input: &str,
    extracted_text: Option<&str>,
    attachments: &[FileRef],
    history: &[Message],
    window: usize,
) -> String {
    let mut context = input.to_string();

    if let Some(extracted) = extracted_text.filter(|t| !t.trim().is_empty()) {
        if !context.is_empty() {
            context.push_str("\n\n");
        }
        context.push_str(extracted);
    }

    if !attachments.is_empty() {
        let names: Vec<&str> = attachments.iter().map(|f| f.name.as_str()).collect();
        context.push_str("\n\nUploaded files: ");
        context.push_str(&names.join(", "));
        context.push_str("\nPlease analyze the content from these files and provide appropriate feedback.");
    }

    let recent = &history[history.len().saturating_sub(window)..];
    if !recent.is_empty() {
        context.push_str("\n\nPrevious conversation context:\n");
        for message in recent {
            context.push_str(&message.context_line());
        }
        context.push_str("\nPlease consider this conversation history when responding.");
    }

    context
}

/// The grader's text, or the fallback text when the call failed or came
/// back blank
pub fn response_or_fallback(result: Result<String, GatewayError>, fallback: &str) -> String {
    match result {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            log::warn!("grader returned an empty response, using fallback");
            fallback.to_string()
        }
        Err(e) => {
            log::warn!("grader call failed: {}", e);
            fallback.to_string()
        }
    }
}
