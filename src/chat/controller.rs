//! ChatController - one conversation view
//!
//! Owns the session's store handle and its single reveal scheduler, and
//! sequences a turn:
//!
//! 1. stop any running reveal (its partial text is committed)
//! 2. validate and record the user message
//! 3. build the grader context from the history before this turn
//! 4. get the response (or the fallback text) and start revealing it
//! 5. `tick()` until done; the final or partial text is committed once
//!
//! Steps 3-4 come in two shapes: `submit()` awaits a `GradingGateway`, while
//! `begin_turn()` + `receive_*()` let a JS host make the network call.

use super::gateway::{build_context, response_or_fallback, GradingGateway};
use super::message::{expand_legacy, session_title, FileRef, Message};
use super::store::ConversationStore;
use crate::config::TutorConfig;
use crate::error::{ChatError, GatewayError};
use crate::reveal::{RevelationScheduler, StopOutcome, Tick};

pub struct ChatController<S: ConversationStore> {
    config: TutorConfig,
    session_id: String,
    store: S,
    scheduler: RevelationScheduler,
    awaiting_response: bool,
}

impl<S: ConversationStore> ChatController<S> {
    pub fn new(config: TutorConfig, session_id: impl Into<String>, store: S) -> Self {
        let scheduler = RevelationScheduler::new(&config);
        Self {
            config,
            session_id: session_id.into(),
            store,
            scheduler,
            awaiting_response: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scheduler(&self) -> &RevelationScheduler {
        &self.scheduler
    }

    /// Subscribe observers here
    pub fn scheduler_mut(&mut self) -> &mut RevelationScheduler {
        &mut self.scheduler
    }

    /// Stored history with legacy rows expanded
    pub fn history(&self) -> Vec<Message> {
        expand_legacy(self.store.load_history(&self.session_id))
    }

    /// History for display: the greeting when nothing is stored yet
    pub fn transcript(&self) -> Vec<Message> {
        let history = self.history();
        if history.is_empty() {
            vec![Message::assistant(self.config.greeting.as_str())]
        } else {
            history
        }
    }

    pub fn title(&self) -> Option<String> {
        session_title(&self.history(), self.config.title_max_chars)
    }

    pub fn is_typing(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    /// Record the user's submission and return the grader context for it
    pub fn begin_turn(
        &mut self,
        input: &str,
        attachments: Vec<FileRef>,
        extracted_text: Option<&str>,
    ) -> Result<String, ChatError> {
        if self.awaiting_response {
            return Err(ChatError::TurnInProgress);
        }
        if input.trim().is_empty() && attachments.is_empty() {
            return Err(ChatError::EmptySubmission);
        }
        if attachments.len() > self.config.max_attachments {
            return Err(ChatError::TooManyAttachments {
                max: self.config.max_attachments,
                got: attachments.len(),
            });
        }

        // A new turn always ends the previous reveal first
        self.stop();

        let history = self.history();
        let context = build_context(
            input,
            extracted_text,
            &attachments,
            &history,
            self.config.history_window,
        );
        self.store.append(&self.session_id, Message::user(input, attachments));
        self.awaiting_response = true;
        log::info!(
            "session {}: turn started ({} history messages in context)",
            self.session_id,
            history.len().min(self.config.history_window)
        );
        Ok(context)
    }

    /// Reveal the grader's response to the pending turn; a blank response
    /// is replaced by the fallback text, as in `submit()`
    pub fn receive_response(&mut self, text: &str) -> Result<usize, ChatError> {
        let text = response_or_fallback(Ok(text.to_string()), &self.config.fallback_message);
        self.finish_turn(&text)
    }

    /// Reveal the fallback text for a failed grader call
    pub fn receive_failure(&mut self, error: &GatewayError) -> Result<usize, ChatError> {
        let fallback = response_or_fallback(Err(error.clone()), &self.config.fallback_message);
        self.finish_turn(&fallback)
    }

    /// Reveal the extraction-failure text; the grader is not called
    pub fn receive_extraction_failure(&mut self) -> Result<usize, ChatError> {
        log::warn!("session {}: file extraction failed", self.session_id);
        let text = self.config.extraction_failure_message.clone();
        self.finish_turn(&text)
    }

    /// Whole turn against an async gateway. Returns the number of reveal units.
    pub async fn submit<G: GradingGateway>(
        &mut self,
        gateway: &G,
        input: &str,
        attachments: Vec<FileRef>,
        extracted_text: Option<&str>,
    ) -> Result<usize, ChatError> {
        let context = self.begin_turn(input, attachments, extracted_text)?;
        let result = gateway.submit(&context).await;
        let text = response_or_fallback(result, &self.config.fallback_message);
        self.finish_turn(&text)
    }

    fn finish_turn(&mut self, text: &str) -> Result<usize, ChatError> {
        if !self.awaiting_response {
            return Err(ChatError::NoPendingTurn);
        }
        self.awaiting_response = false;
        Ok(self.scheduler.start(text)?)
    }

    /// Advance the reveal; the completed message is committed here
    pub fn tick(&mut self) -> Tick {
        let tick = self.scheduler.tick();
        if let Tick::Done(message) = &tick {
            self.store.append(&self.session_id, message.clone());
        }
        tick
    }

    /// Stop the reveal; the partial message, if any, is committed here
    pub fn stop(&mut self) -> StopOutcome {
        let outcome = self.scheduler.stop();
        if let Some(message) = outcome.committed() {
            self.store.append(&self.session_id, message.clone());
        }
        outcome
    }

    /// Start over: stop any reveal and forget the session's messages
    pub fn reset(&mut self) {
        self.scheduler.stop();
        self.store.clear(&self.session_id);
        self.awaiting_response = false;
        log::info!("session {}: history cleared", self.session_id);
    }

    /// Run the reveal to completion without a timer (replays, tests)
    pub fn finish_now(&mut self) -> Option<Message> {
        loop {
            match self.tick() {
                Tick::Frame { .. } => continue,
                Tick::Done(message) => return Some(message),
                Tick::Idle => return None,
            }
        }
    }
}
