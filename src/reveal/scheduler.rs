//! RevelationScheduler - the typing state machine
//!
//! # States
//! `Idle → Running → {Completed, Stopped}`; a terminal state only leads to a
//! brand-new session via `start()`.
//!
//! # Driving
//! The host calls `tick()` every `frame_interval_ms`. Each tick reveals one
//! frame; the tick after the last unit finalizes the session and hands back
//! the completed message. Nothing here sleeps or spawns: time is the host's
//! business, which keeps every transition testable.
//!
//! # Usage
//! ```rust
//! use tutorcore::reveal::{RevelationScheduler, Tick};
//!
//! let mut scheduler = RevelationScheduler::default();
//! scheduler.start("Hello\n| A | B |\n| 1 | 2 |\n").unwrap();
//! let message = loop {
//!     if let Tick::Done(message) = scheduler.tick() {
//!         break message;
//!     }
//! };
//! assert!(message.content.starts_with("Hello"));
//! ```

use crate::chat::Message;
use crate::config::TutorConfig;
use crate::error::RevealError;
use crate::markdown::{scan, MarkdownSanitizer, TextNormalizer};

use super::session::{RevealStatus, RevelationSession, Step};

// =============================================================================
// Observer interface
// =============================================================================

/// One visible state of the reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Everything revealed so far
    pub text: &'a str,
    /// Unit the frame came from
    pub unit_index: usize,
    /// True when a whole Table/Atomic unit appeared in this frame
    pub atomic: bool,
}

/// Terminal notification of a session
#[derive(Debug, Clone, PartialEq)]
pub enum Finish {
    /// Every unit was revealed; the message holds the full text
    Completed(Message),
    /// Interrupted; the message holds the trimmed partial text, if any
    Stopped(Option<Message>),
}

/// Subscriber to frame updates and the terminal notification
pub trait RevealObserver {
    fn on_frame(&mut self, frame: &Frame<'_>);
    fn on_finish(&mut self, finish: &Finish);
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

// =============================================================================
// Tick / stop results
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// No running session
    Idle,
    /// A frame was produced; read it with `revealed()`
    Frame { unit_index: usize, atomic: bool },
    /// The session completed; the message must be committed
    Done(Message),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    /// The running session was halted; `Some` when there was content to commit
    Interrupted(Option<Message>),
    /// Nothing was running. Stopping after a natural completion lands here,
    /// so the completed message is never committed twice.
    NotRunning(RevealStatus),
}

impl StopOutcome {
    pub fn committed(&self) -> Option<&Message> {
        match self {
            StopOutcome::Interrupted(message) => message.as_ref(),
            StopOutcome::NotRunning(_) => None,
        }
    }
}

// =============================================================================
// RevelationScheduler
// =============================================================================

pub struct RevelationScheduler {
    normalizer: TextNormalizer,
    sanitizer: MarkdownSanitizer,
    frame_interval_ms: u32,
    status: RevealStatus,
    session: Option<RevelationSession>,
    observers: Vec<(SubscriptionId, Box<dyn RevealObserver>)>,
    next_subscription: u32,
}

impl Default for RevelationScheduler {
    fn default() -> Self {
        Self::new(&TutorConfig::default())
    }
}

impl RevelationScheduler {
    pub fn new(config: &TutorConfig) -> Self {
        Self {
            normalizer: TextNormalizer::new(&config.section_titles),
            sanitizer: MarkdownSanitizer::new(),
            frame_interval_ms: config.frame_interval_ms,
            status: RevealStatus::Idle,
            session: None,
            observers: Vec::new(),
            next_subscription: 1,
        }
    }

    pub fn status(&self) -> RevealStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == RevealStatus::Running
    }

    pub fn frame_interval_ms(&self) -> u32 {
        self.frame_interval_ms
    }

    /// The active session, if one is running
    pub fn session(&self) -> Option<&RevelationSession> {
        self.session.as_ref()
    }

    /// Text revealed so far by the running session
    pub fn revealed(&self) -> &str {
        self.session.as_ref().map_or("", RevelationSession::revealed_prefix)
    }

    /// normalize + sanitize: the exact text a session reveals and commits
    pub fn prepare(&self, text: &str) -> String {
        self.sanitizer.sanitize(&self.normalizer.normalize(text))
    }

    pub fn subscribe(&mut self, observer: Box<dyn RevealObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    /// Returns false when the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Begin revealing `text`. Returns the number of reveal units.
    pub fn start(&mut self, text: &str) -> Result<usize, RevealError> {
        if self.is_running() {
            return Err(RevealError::SessionActive);
        }

        let full_text = self.prepare(text);
        let units = scan(&full_text);
        let count = units.len();
        self.session = Some(RevelationSession::new(full_text, units));
        self.status = RevealStatus::Running;
        log::debug!("reveal started: {} units", count);
        Ok(count)
    }

    /// Produce one frame, or finalize once every unit has been shown
    pub fn tick(&mut self) -> Tick {
        if !self.is_running() {
            return Tick::Idle;
        }
        let Some(session) = self.session.as_mut() else {
            return Tick::Idle;
        };

        match session.advance() {
            Step::Revealed { unit_index, atomic } => {
                let frame = Frame {
                    text: session.revealed_prefix(),
                    unit_index,
                    atomic,
                };
                for (_, observer) in self.observers.iter_mut() {
                    observer.on_frame(&frame);
                }
                Tick::Frame { unit_index, atomic }
            }
            Step::Exhausted => {
                let message = Message::assistant(session.full_text());
                self.session = None;
                self.status = RevealStatus::Completed;
                log::debug!("reveal completed ({} bytes)", message.content.len());
                self.notify_finish(&Finish::Completed(message.clone()));
                Tick::Done(message)
            }
        }
    }

    /// Halt the running session, keeping whatever is already visible
    pub fn stop(&mut self) -> StopOutcome {
        if !self.is_running() {
            return StopOutcome::NotRunning(self.status);
        }
        let Some(session) = self.session.take() else {
            return StopOutcome::NotRunning(self.status);
        };

        let partial = session.revealed_prefix().trim_end();
        let committed = (!partial.is_empty()).then(|| Message::assistant(partial));
        self.status = RevealStatus::Stopped;
        log::debug!(
            "reveal stopped at {}/{} bytes",
            session.revealed_len(),
            session.full_text().len()
        );
        self.notify_finish(&Finish::Stopped(committed.clone()));
        StopOutcome::Interrupted(committed)
    }

    fn notify_finish(&mut self, finish: &Finish) {
        for (_, observer) in self.observers.iter_mut() {
            observer.on_finish(finish);
        }
    }
}
