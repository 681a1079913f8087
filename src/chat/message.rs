//! Chat message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker older clients used to store a user turn and its answer in one row
pub const LEGACY_RESPONSE_MARKER: &str = "\n\n---\n\nAI Response:\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "ai")]
    Assistant,
}

impl Role {
    /// Speaker label used in the grader context
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "AI",
        }
    }
}

/// Attachment metadata. File bytes never reach this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub mime_hint: String,
    pub byte_size: u64,
}

impl FileRef {
    pub fn new(name: impl Into<String>, mime_hint: impl Into<String>, byte_size: u64) -> Self {
        Self {
            name: name.into(),
            mime_hint: mime_hint.into(),
            byte_size,
        }
    }
}

/// A committed chat message. Never mutated after it reaches the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<FileRef>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>, attachments: Vec<FileRef>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            attachments,
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            attachments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// `"<Role>: <content>\n"`, the history line format sent to the grader
    pub fn context_line(&self) -> String {
        format!("{}: {}\n", self.role.label(), self.content)
    }

    /// Split a legacy combined row into its user and assistant halves.
    /// Any other message comes back unchanged.
    pub fn split_legacy(self) -> Vec<Message> {
        if self.role != Role::User {
            return vec![self];
        }
        match self.content.split_once(LEGACY_RESPONSE_MARKER) {
            Some((question, answer)) => {
                let answer = Message {
                    role: Role::Assistant,
                    content: answer.to_string(),
                    attachments: Vec::new(),
                    created_at: self.created_at,
                };
                let question = Message {
                    content: question.to_string(),
                    ..self
                };
                vec![question, answer]
            }
            None => vec![self],
        }
    }
}

/// Expand legacy combined rows across a whole history
pub fn expand_legacy(history: Vec<Message>) -> Vec<Message> {
    history.into_iter().flat_map(Message::split_legacy).collect()
}

/// Session title from the first user message: the first `max_chars`
/// characters, with `...` when cut.
pub fn session_title(history: &[Message], max_chars: usize) -> Option<String> {
    let first = history
        .iter()
        .find(|m| m.role == Role::User && !m.content.is_empty())?;
    let mut title: String = first.content.chars().take(max_chars).collect();
    if first.content.chars().count() > max_chars {
        title.push_str("...");
    }
    Some(title)
}
