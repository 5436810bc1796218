//! Transcript turn types for profchat.
//!
//! A transcript is an ordered sequence of [`Turn`]s. The last assistant turn
//! may be "open" while its reply is streaming in; [`OpenTurn`] identifies it
//! and [`TurnOutcome`] records how it was closed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Default seed greeting shown at the top of every new transcript.
pub const DEFAULT_GREETING: &str =
    "Hi! I'm the Rate My Professor support assistant. How can I help you today?";

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("invalid role: '{other}'")),
        }
    }
}

/// One message in the transcript.
///
/// Serializes as `{"role": "...", "content": "..."}`, which is also the
/// element shape of the chat endpoint's request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Handle to the assistant turn opened by a user submission.
///
/// Only valid until the turn is closed; the store rejects extends once the
/// turn is no longer open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenTurn {
    /// Position of the open turn in the transcript (always the last index).
    pub index: usize,
    /// Identifier of the exchange that opened this turn.
    pub exchange: Uuid,
}

/// How an open turn was closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The response stream ended normally.
    Completed,
    /// The transport failed; the turn keeps whatever content arrived.
    Failed { reason: String },
    /// The caller abandoned the exchange.
    Cancelled,
}

impl fmt::Display for TurnOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnOutcome::Completed => write!(f, "completed"),
            TurnOutcome::Failed { reason } => write!(f, "failed: {reason}"),
            TurnOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Read-only copy of the transcript at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSnapshot {
    pub turns: Vec<Turn>,
    /// Index of the open turn, if a reply is still streaming.
    pub open: Option<usize>,
}

impl TranscriptSnapshot {
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The open turn, if any.
    pub fn open_turn(&self) -> Option<&Turn> {
        self.open.and_then(|i| self.turns.get(i))
    }
}
