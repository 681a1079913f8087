//! Configuration types and defaults
//!
//! One `TutorConfig` drives the reveal engine and the chat turn layer. JS
//! hosts pass a plain object; any field left out keeps its default.

use serde::{Deserialize, Serialize};

use crate::markdown::SECTION_TITLES;

/// Milliseconds between frames of the original typing effect
pub const DEFAULT_FRAME_INTERVAL_MS: u32 = 15;

pub const DEFAULT_GREETING: &str = "Hi there! I'm Hedge's AI Tutor. How can I help you today? \
You can ask me about school, grading, or any academic-related questions!";

pub const DEFAULT_FALLBACK_MESSAGE: &str = "Sorry, something went wrong.";

pub const DEFAULT_EXTRACTION_FAILURE_MESSAGE: &str = "Sorry, file extraction failed. Please try again.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    /// Period the host timer should call `tick()` at. Default: 15
    pub frame_interval_ms: u32,
    /// Prior turns sent to the grader as context. Default: 5
    pub history_window: usize,
    /// Attachments accepted per submission. Default: 10
    pub max_attachments: usize,
    /// Characters of the first user message used as session title. Default: 30
    pub title_max_chars: usize,
    /// Phrases promoted to a `---` section break by the normalizer
    pub section_titles: Vec<String>,
    /// Assistant text recorded when the grader fails
    pub fallback_message: String,
    /// Assistant text recorded when file extraction fails
    pub extraction_failure_message: String,
    /// First assistant message of a session with no history
    pub greeting: String,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            history_window: 5,
            max_attachments: 10,
            title_max_chars: 30,
            section_titles: SECTION_TITLES.iter().map(|s| s.to_string()).collect(),
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            extraction_failure_message: DEFAULT_EXTRACTION_FAILURE_MESSAGE.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

impl TutorConfig {
    /// No frame delay, for replays and tests
    pub fn instant() -> Self {
        Self {
            frame_interval_ms: 0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_typing_client() {
        let config = TutorConfig::default();
        assert_eq!(config.frame_interval_ms, 15);
        assert_eq!(config.history_window, 5);
        assert_eq!(config.max_attachments, 10);
        assert_eq!(config.section_titles.len(), 4);
        assert_eq!(TutorConfig::instant().frame_interval_ms, 0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: TutorConfig =
            serde_json::from_str(r#"{ "frame_interval_ms": 40, "history_window": 2 }"#).unwrap();
        assert_eq!(config.frame_interval_ms, 40);
        assert_eq!(config.history_window, 2);
        assert_eq!(config.fallback_message, DEFAULT_FALLBACK_MESSAGE);
        assert_eq!(config.section_titles[0], "What You Should Do Now");
    }
}
