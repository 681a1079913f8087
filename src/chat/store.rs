//! ConversationStore - the message log boundary
//!
//! Persistence is owned by the host. From the engine's side `append` is
//! fire-and-forget: a store that fails to persist logs the failure itself.
//! `load_history` is only called between turns, never while a reveal runs.

use std::collections::HashMap;

use super::message::Message;

pub trait ConversationStore {
    /// Record a committed message at the end of a session's log
    fn append(&mut self, session_id: &str, message: Message);

    /// Messages of a session in commit order
    fn load_history(&self, session_id: &str) -> Vec<Message>;

    /// Drop every message of a session
    fn clear(&mut self, session_id: &str);
}

/// In-memory store, used by the WASM chat view and by tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    sessions: HashMap<String, Vec<Message>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a session with previously persisted messages
    pub fn with_history(session_id: &str, history: Vec<Message>) -> Self {
        let mut store = Self::new();
        store.sessions.insert(session_id.to_string(), history);
        store
    }

    pub fn message_count(&self, session_id: &str) -> usize {
        self.sessions.get(session_id).map_or(0, Vec::len)
    }

    /// One session's log as a JSON array, for the host to persist
    pub fn session_json(&self, session_id: &str) -> serde_json::Result<String> {
        match self.sessions.get(session_id) {
            Some(messages) => serde_json::to_string(messages),
            None => Ok("[]".to_string()),
        }
    }
}

impl ConversationStore for MemoryStore {
    fn append(&mut self, session_id: &str, message: Message) {
        log::debug!(
            "session {}: storing {} message ({} bytes)",
            session_id,
            message.role.label(),
            message.content.len()
        );
        self.sessions.entry(session_id.to_string()).or_default().push(message);
    }

    fn load_history(&self, session_id: &str) -> Vec<Message> {
        self.sessions.get(session_id).cloned().unwrap_or_default()
    }

    fn clear(&mut self, session_id: &str) {
        self.sessions.remove(session_id);
    }
}
