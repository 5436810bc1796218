//! Transcript change notifications.
//!
//! Published by the transcript store on every mutation so that observers
//! (the terminal renderer, tests) can follow the conversation without
//! holding a reference to the store's internals.

use serde::{Deserialize, Serialize};

use crate::chat::{Role, TurnOutcome};

/// A single change to the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptEvent {
    /// A turn was appended at `index`.
    TurnAppended { index: usize, role: Role },

    /// `delta` was appended to the open turn at `index`.
    TurnExtended { index: usize, delta: String },

    /// The open turn at `index` was closed.
    TurnClosed { index: usize, outcome: TurnOutcome },
}
