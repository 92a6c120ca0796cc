//! Transcript of a chat session
//!
//! Turns are only ever appended. Nothing here reorders, edits or truncates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Bot,
}

/// One message in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    speaker: Speaker,
    text: String,
    at: DateTime<Utc>,
}

impl Turn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Speaker::Bot, text)
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Ordered, append-only sequence of turns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Start a transcript with a single bot greeting
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::bot(greeting)],
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }
}

impl Deref for Transcript {
    type Target = [Turn];

    fn deref(&self) -> &[Turn] {
        &self.turns
    }
}
