//! Transcript store: the single owner of the conversation's turns.
//!
//! The store is cheaply cloneable and internally synchronised. During an
//! exchange the chat service is its only writer; renderers observe it via
//! `snapshot()` or the change notifications from `subscribe()`.
//!
//! Invariant: at most one turn is open, and an open turn is always the last
//! turn and always an assistant turn.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use profchat_types::chat::{OpenTurn, Role, TranscriptSnapshot, Turn, TurnOutcome};
use profchat_types::error::ChatError;
use profchat_types::event::TranscriptEvent;

use super::bus::TranscriptBus;

/// Default capacity of the change-notification channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

struct TranscriptState {
    turns: Vec<Turn>,
    open: Option<OpenTurn>,
}

/// Shared, ordered transcript with at most one open assistant turn.
#[derive(Clone)]
pub struct TranscriptStore {
    state: Arc<RwLock<TranscriptState>>,
    bus: TranscriptBus,
}

impl TranscriptStore {
    /// Create a transcript seeded with one closed assistant greeting.
    pub fn new(greeting: impl Into<String>) -> Self {
        Self::with_capacity(greeting, DEFAULT_EVENT_CAPACITY)
    }

    /// Like [`TranscriptStore::new`] with an explicit notification capacity.
    pub fn with_capacity(greeting: impl Into<String>, event_capacity: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(TranscriptState {
                turns: vec![Turn::assistant(greeting)],
                open: None,
            })),
            bus: TranscriptBus::new(event_capacity),
        }
    }

    /// Append a user turn and an empty assistant placeholder, opening the latter.
    ///
    /// Both turns are appended under one write lock, so observers never see
    /// the user turn without its placeholder.
    ///
    /// # Errors
    ///
    /// - [`ChatError::Validation`] if `text` is blank after trimming.
    /// - [`ChatError::ConcurrentExchange`] if a turn is already open.
    ///
    /// Neither error mutates the transcript.
    pub fn append_user_turn(&self, text: &str) -> Result<OpenTurn, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::Validation("message is empty".to_string()));
        }

        let mut state = self.write();
        if state.open.is_some() {
            return Err(ChatError::ConcurrentExchange);
        }

        state.turns.push(Turn::user(text));
        self.bus.publish(TranscriptEvent::TurnAppended {
            index: state.turns.len() - 1,
            role: Role::User,
        });

        state.turns.push(Turn::assistant(String::new()));
        let open = OpenTurn {
            index: state.turns.len() - 1,
            exchange: Uuid::now_v7(),
        };
        state.open = Some(open);
        self.bus.publish(TranscriptEvent::TurnAppended {
            index: open.index,
            role: Role::Assistant,
        });

        debug!(index = open.index, exchange = %open.exchange, "Opened assistant turn");
        Ok(open)
    }

    /// Append `delta` to whichever turn is currently open.
    ///
    /// An empty delta is accepted and changes nothing.
    ///
    /// # Errors
    ///
    /// [`ChatError::NoOpenTurn`] if no turn is open.
    pub fn extend_open_turn(&self, delta: &str) -> Result<(), ChatError> {
        let mut state = self.write();
        let open = state.open.ok_or(ChatError::NoOpenTurn)?;
        self.extend_locked(&mut state, open, delta);
        Ok(())
    }

    /// Append `delta` to the turn identified by `turn`.
    ///
    /// # Errors
    ///
    /// [`ChatError::NoOpenTurn`] if `turn` has already been closed.
    pub fn extend_turn(&self, turn: &OpenTurn, delta: &str) -> Result<(), ChatError> {
        let mut state = self.write();
        match state.open {
            Some(open) if open == *turn => {
                self.extend_locked(&mut state, open, delta);
                Ok(())
            }
            _ => Err(ChatError::NoOpenTurn),
        }
    }

    /// Close the open turn as completed. No-op if nothing is open.
    pub fn close_open_turn(&self) {
        self.finish_open_turn(TurnOutcome::Completed);
    }

    /// Close the open turn with `outcome`.
    ///
    /// Returns the index of the closed turn, or `None` if nothing was open.
    pub fn finish_open_turn(&self, outcome: TurnOutcome) -> Option<usize> {
        let mut state = self.write();
        let open = state.open?;
        Some(self.close_locked(&mut state, open, outcome))
    }

    /// Close the turn identified by `turn` with `outcome`.
    ///
    /// Returns `None` (and leaves the transcript alone) if `turn` is not the
    /// currently open turn.
    pub fn finish_turn(&self, turn: &OpenTurn, outcome: TurnOutcome) -> Option<usize> {
        let mut state = self.write();
        match state.open {
            Some(open) if open == *turn => Some(self.close_locked(&mut state, open, outcome)),
            _ => None,
        }
    }

    /// Owned copy of the transcript and its open marker.
    pub fn snapshot(&self) -> TranscriptSnapshot {
        let state = self.read();
        TranscriptSnapshot {
            turns: state.turns.clone(),
            open: state.open.map(|o| o.index),
        }
    }

    /// Owned copy of the turns, in conversation order.
    pub fn history(&self) -> Vec<Turn> {
        self.read().turns.clone()
    }

    /// Handle of the open turn, if a reply is streaming.
    pub fn open_turn(&self) -> Option<OpenTurn> {
        self.read().open
    }

    pub fn is_open(&self) -> bool {
        self.read().open.is_some()
    }

    pub fn len(&self) -> usize {
        self.read().turns.len()
    }

    /// Always false after construction; the transcript starts with a greeting.
    pub fn is_empty(&self) -> bool {
        self.read().turns.is_empty()
    }

    /// Subscribe to change notifications for every future mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.bus.subscribe()
    }

    fn extend_locked(&self, state: &mut TranscriptState, open: OpenTurn, delta: &str) {
        if delta.is_empty() {
            return;
        }
        if let Some(turn) = state.turns.get_mut(open.index) {
            turn.content.push_str(delta);
            self.bus.publish(TranscriptEvent::TurnExtended {
                index: open.index,
                delta: delta.to_string(),
            });
        }
    }

    fn close_locked(&self, state: &mut TranscriptState, open: OpenTurn, outcome: TurnOutcome) -> usize {
        state.open = None;
        debug!(index = open.index, exchange = %open.exchange, %outcome, "Closed assistant turn");
        self.bus.publish(TranscriptEvent::TurnClosed {
            index: open.index,
            outcome,
        });
        open.index
    }

    // Every mutation is a single push or push_str, so a poisoned lock still
    // guards a consistent transcript.
    fn read(&self) -> RwLockReadGuard<'_, TranscriptState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TranscriptState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for TranscriptStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("TranscriptStore")
            .field("turns", &state.turns.len())
            .field("open", &state.open.map(|o| o.index))
            .field("bus", &self.bus)
            .finish()
    }
}
