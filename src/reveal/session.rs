//! RevelationSession - progress state of one assistant reveal
//!
//! The session owns the prepared text and its units. The revealed prefix is
//! always `full_text[..revealed]`, so it can only grow and, once every unit
//! is consumed, it is exactly the full text.

use serde::{Deserialize, Serialize};

use crate::markdown::RevealUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealStatus {
    Idle,
    Running,
    Stopped,
    Completed,
}

impl RevealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevealStatus::Idle => "idle",
            RevealStatus::Running => "running",
            RevealStatus::Stopped => "stopped",
            RevealStatus::Completed => "completed",
        }
    }

    /// Completed and Stopped only lead to a brand-new session
    pub fn is_terminal(&self) -> bool {
        matches!(self, RevealStatus::Stopped | RevealStatus::Completed)
    }
}

/// Result of advancing a session by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// More text became visible
    Revealed { unit_index: usize, atomic: bool },
    /// Every unit has been revealed
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct RevelationSession {
    full_text: String,
    units: Vec<RevealUnit>,
    unit_cursor: usize,
    char_cursor: usize,
    revealed: usize,
}

impl RevelationSession {
    pub fn new(full_text: String, units: Vec<RevealUnit>) -> Self {
        debug_assert_eq!(
            units.iter().map(RevealUnit::len).sum::<usize>(),
            full_text.len(),
            "units must cover the text exactly"
        );
        Self {
            full_text,
            units,
            unit_cursor: 0,
            char_cursor: 0,
            revealed: 0,
        }
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn units(&self) -> &[RevealUnit] {
        &self.units
    }

    pub fn unit_cursor(&self) -> usize {
        self.unit_cursor
    }

    pub fn char_cursor(&self) -> usize {
        self.char_cursor
    }

    pub fn revealed_prefix(&self) -> &str {
        &self.full_text[..self.revealed]
    }

    pub fn revealed_len(&self) -> usize {
        self.revealed
    }

    pub fn is_exhausted(&self) -> bool {
        self.unit_cursor >= self.units.len()
    }

    /// Reveal the next frame: a whole Table/Atomic unit, or one granule of a
    /// CharByChar unit.
    pub fn advance(&mut self) -> Step {
        let Some(unit) = self.units.get(self.unit_cursor) else {
            return Step::Exhausted;
        };
        let unit_index = self.unit_cursor;

        if unit.is_atomic() {
            self.revealed = unit.end();
            self.unit_cursor += 1;
            return Step::Revealed { unit_index, atomic: true };
        }

        self.char_cursor += 1;
        self.revealed = unit.offset_after(self.char_cursor);
        if self.char_cursor == unit.granule_count() {
            self.char_cursor = 0;
            self.unit_cursor += 1;
        }
        Step::Revealed { unit_index, atomic: false }
    }
}
