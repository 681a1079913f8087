//! Tests for ChatController
//!
//! Turn sequencing against a mock grader and the in-memory store.

use std::cell::RefCell;

use futures::executor::block_on;

use crate::chat::controller::ChatController;
use crate::chat::gateway::GradingGateway;
use crate::chat::message::{FileRef, Message, Role};
use crate::chat::store::{ConversationStore, MemoryStore};
use crate::config::{TutorConfig, DEFAULT_EXTRACTION_FAILURE_MESSAGE, DEFAULT_FALLBACK_MESSAGE, DEFAULT_GREETING};
use crate::error::{ChatError, GatewayError};
use crate::reveal::Tick;

const SESSION: &str = "session-1";

struct MockGateway {
    reply: Result<String, GatewayError>,
    contexts: RefCell<Vec<String>>,
}

impl MockGateway {
    fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            contexts: RefCell::new(Vec::new()),
        }
    }

    fn failing(error: GatewayError) -> Self {
        Self {
            reply: Err(error),
            contexts: RefCell::new(Vec::new()),
        }
    }
}

impl GradingGateway for MockGateway {
    async fn submit(&self, context: &str) -> Result<String, GatewayError> {
        self.contexts.borrow_mut().push(context.to_string());
        self.reply.clone()
    }
}

fn controller() -> ChatController<MemoryStore> {
    ChatController::new(TutorConfig::instant(), SESSION, MemoryStore::new())
}

fn contents(history: &[Message]) -> Vec<(Role, &str)> {
    history.iter().map(|m| (m.role, m.content.as_str())).collect()
}

fn files(count: usize) -> Vec<FileRef> {
    (0..count)
        .map(|i| FileRef::new(format!("file{}.pdf", i), "application/pdf", 1024))
        .collect()
}

// ============================================================================
// Full turns
// ============================================================================

#[test]
fn test_turn_commits_user_then_assistant() {
    let mut chat = controller();
    let gateway = MockGateway::replying("Nice essay");

    block_on(chat.submit(&gateway, "Grade this", vec![], None)).unwrap();
    assert!(chat.is_typing());
    // Only the user message is stored while the reveal runs
    assert_eq!(chat.store().message_count(SESSION), 1);

    let message = chat.finish_now().unwrap();
    assert_eq!(message.content, "Nice essay");
    assert!(!chat.is_typing());
    assert_eq!(
        contents(&chat.history()),
        vec![(Role::User, "Grade this"), (Role::Assistant, "Nice essay")]
    );
    assert_eq!(gateway.contexts.borrow()[0], "Grade this");
}

#[test]
fn test_gateway_failure_reveals_fallback() {
    let mut chat = controller();
    let gateway = MockGateway::failing(GatewayError::Network("timeout".into()));

    block_on(chat.submit(&gateway, "Grade this", vec![], None)).unwrap();
    let message = chat.finish_now().unwrap();
    assert_eq!(message.content, DEFAULT_FALLBACK_MESSAGE);
    assert_eq!(chat.history().len(), 2);
}

#[test]
fn test_second_turn_sends_history() {
    let mut chat = controller();
    block_on(chat.submit(&MockGateway::replying("First answer"), "First", vec![], None)).unwrap();
    chat.finish_now();

    let gateway = MockGateway::replying("Second answer");
    block_on(chat.submit(&gateway, "Second", vec![], None)).unwrap();
    let context = gateway.contexts.borrow()[0].clone();
    assert!(context.starts_with("Second\n\nPrevious conversation context:\n"));
    assert!(context.contains("User: First\nAI: First answer\n"));
}

#[test]
fn test_split_turn_with_host_network_call() {
    let mut chat = controller();
    let context = chat
        .begin_turn("Check this", files(1), Some("Extracted essay"))
        .unwrap();
    assert!(context.contains("Extracted essay"));
    assert!(context.contains("Uploaded files: file0.pdf"));
    assert!(chat.is_awaiting_response());

    chat.receive_response("Looks fine").unwrap();
    assert!(!chat.is_awaiting_response());
    assert_eq!(chat.finish_now().unwrap().content, "Looks fine");
    assert_eq!(chat.history()[0].attachments.len(), 1);
}

#[test]
fn test_blank_host_response_reveals_fallback() {
    let mut chat = controller();
    chat.begin_turn("Q", vec![], None).unwrap();
    chat.receive_response("  \n").unwrap();
    assert_eq!(chat.finish_now().unwrap().content, DEFAULT_FALLBACK_MESSAGE);
    assert_eq!(
        contents(&chat.history()),
        vec![(Role::User, "Q"), (Role::Assistant, DEFAULT_FALLBACK_MESSAGE)]
    );
}

#[test]
fn test_receive_failure_reveals_fallback() {
    let mut chat = controller();
    chat.begin_turn("Q", vec![], None).unwrap();
    chat.receive_failure(&GatewayError::EmptyResponse).unwrap();
    assert_eq!(chat.finish_now().unwrap().content, DEFAULT_FALLBACK_MESSAGE);
}

#[test]
fn test_extraction_failure_message() {
    let mut chat = controller();
    chat.begin_turn("", files(1), None).unwrap();
    chat.receive_extraction_failure().unwrap();
    assert_eq!(chat.finish_now().unwrap().content, DEFAULT_EXTRACTION_FAILURE_MESSAGE);
}

// ============================================================================
// Stop
// ============================================================================

#[test]
fn test_stop_commits_exactly_one_partial_message() {
    let mut chat = controller();
    block_on(chat.submit(&MockGateway::replying("Hello world"), "Q", vec![], None)).unwrap();
    for _ in 0..5 {
        chat.tick();
    }

    assert!(chat.stop().committed().is_some());
    assert!(chat.stop().committed().is_none());
    assert_eq!(chat.tick(), Tick::Idle);
    assert_eq!(
        contents(&chat.history()),
        vec![(Role::User, "Q"), (Role::Assistant, "Hello")]
    );
}

#[test]
fn test_new_turn_stops_running_reveal() {
    let mut chat = controller();
    block_on(chat.submit(&MockGateway::replying("Hello world"), "Q", vec![], None)).unwrap();
    for _ in 0..3 {
        chat.tick();
    }

    chat.begin_turn("Next", vec![], None).unwrap();
    assert_eq!(
        contents(&chat.history()),
        vec![(Role::User, "Q"), (Role::Assistant, "Hel"), (Role::User, "Next")]
    );
}

#[test]
fn test_stop_after_completion_adds_nothing() {
    let mut chat = controller();
    block_on(chat.submit(&MockGateway::replying("Done"), "Q", vec![], None)).unwrap();
    chat.finish_now();
    chat.stop();
    assert_eq!(chat.history().len(), 2);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_empty_submission_rejected() {
    let mut chat = controller();
    assert_eq!(chat.begin_turn("   ", vec![], None), Err(ChatError::EmptySubmission));
    assert_eq!(chat.store().message_count(SESSION), 0);
}

#[test]
fn test_attachment_cap() {
    let mut chat = controller();
    assert_eq!(
        chat.begin_turn("Q", files(11), None),
        Err(ChatError::TooManyAttachments { max: 10, got: 11 })
    );
    assert!(chat.begin_turn("Q", files(10), None).is_ok());
}

#[test]
fn test_turn_in_progress_and_no_pending_turn() {
    let mut chat = controller();
    assert_eq!(chat.receive_response("early"), Err(ChatError::NoPendingTurn));

    chat.begin_turn("Q", vec![], None).unwrap();
    assert_eq!(chat.begin_turn("Again", vec![], None), Err(ChatError::TurnInProgress));
}

// ============================================================================
// Session view
// ============================================================================

#[test]
fn test_empty_session_transcript_is_greeting() {
    let chat = controller();
    let transcript = chat.transcript();
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].role, Role::Assistant);
    assert_eq!(transcript[0].content, DEFAULT_GREETING);
    assert_eq!(chat.title(), None);
}

#[test]
fn test_legacy_history_expanded() {
    let store = MemoryStore::with_history(
        SESSION,
        vec![Message::user("Old question\n\n---\n\nAI Response:\nOld answer", vec![])],
    );
    let chat = ChatController::new(TutorConfig::instant(), SESSION, store);
    assert_eq!(
        contents(&chat.history()),
        vec![(Role::User, "Old question"), (Role::Assistant, "Old answer")]
    );
    assert_eq!(chat.store().load_history(SESSION).len(), 1);
    assert_eq!(chat.title().as_deref(), Some("Old question"));
}

#[test]
fn test_sessions_are_isolated() {
    let mut store = MemoryStore::new();
    store.append("other", Message::user("elsewhere", vec![]));
    let chat = ChatController::new(TutorConfig::instant(), SESSION, store);
    assert!(chat.history().is_empty());
    assert_eq!(chat.store().message_count("other"), 1);
}

#[test]
fn test_reset_clears_session() {
    let mut chat = controller();
    block_on(chat.submit(&MockGateway::replying("Hello world"), "Q", vec![], None)).unwrap();
    chat.tick();

    chat.reset();
    assert!(!chat.is_typing());
    assert!(!chat.is_awaiting_response());
    assert!(chat.history().is_empty());
    assert_eq!(chat.transcript()[0].content, DEFAULT_GREETING);

    // A fresh turn works after the reset
    chat.begin_turn("Again", vec![], None).unwrap();
    assert_eq!(chat.history().len(), 1);
}

#[test]
fn test_reset_while_awaiting_response() {
    let mut chat = controller();
    chat.begin_turn("Q", vec![], None).unwrap();
    chat.reset();
    assert_eq!(chat.receive_response("late"), Err(ChatError::NoPendingTurn));
    assert_eq!(chat.store().message_count(SESSION), 0);
}

#[test]
fn test_session_json_export() {
    let mut store = MemoryStore::new();
    assert_eq!(store.session_json(SESSION).unwrap(), "[]");

    store.append(SESSION, Message::user("Q", vec![]));
    store.append(SESSION, Message::assistant("A"));
    store.append("other", Message::user("elsewhere", vec![]));

    let restored: Vec<Message> = serde_json::from_str(&store.session_json(SESSION).unwrap()).unwrap();
    assert_eq!(contents(&restored), vec![(Role::User, "Q"), (Role::Assistant, "A")]);

    store.clear(SESSION);
    assert_eq!(store.message_count(SESSION), 0);
    assert_eq!(store.message_count("other"), 1);
}
