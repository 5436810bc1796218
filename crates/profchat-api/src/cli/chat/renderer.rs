//! Streaming transcript renderer.
//!
//! `TranscriptRenderer` observes the transcript through its change
//! notifications and prints an assistant reply as it streams in: the label
//! when the placeholder is appended, each delta raw as it arrives, and a
//! visible indicator when the turn is closed as failed or cancelled.
//!
//! If the renderer falls behind the notification channel it stops trusting
//! deltas and prints from transcript snapshots until the turn closes, so
//! nothing is printed twice or skipped.

use std::io::{self, Write};

use console::style;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use profchat_core::transcript::TranscriptStore;
use profchat_types::chat::{Role, TurnOutcome};
use profchat_types::event::TranscriptEvent;

/// How rendering of one assistant turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSummary {
    pub index: Option<usize>,
    pub outcome: Option<TurnOutcome>,
    /// Notifications dropped because the renderer fell behind.
    pub lagged: u64,
}

/// Prints one streamed assistant turn to `out`.
pub struct TranscriptRenderer<W: Write> {
    store: TranscriptStore,
    out: W,
    label: Option<String>,
    target: Option<usize>,
    /// Bytes of the target turn's content already written.
    printed: usize,
    resync: bool,
    lagged: u64,
}

impl<W: Write> TranscriptRenderer<W> {
    pub fn new(store: TranscriptStore, out: W) -> Self {
        Self {
            store,
            out,
            label: Some(format!("{}", style("Assistant").cyan().bold())),
            target: None,
            printed: 0,
            resync: false,
            lagged: 0,
        }
    }

    /// Label printed before the reply; `None` prints the bare reply.
    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    /// Render events until the assistant turn closes or the channel closes.
    pub async fn run(
        mut self,
        mut rx: broadcast::Receiver<TranscriptEvent>,
    ) -> io::Result<RenderSummary> {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(outcome) = self.handle(&event)? {
                        return Ok(self.summary(Some(outcome)));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Renderer lagged behind transcript; resyncing from snapshot");
                    self.lagged += skipped;
                    self.resync = true;
                    self.adopt_open_turn()?;
                    self.catch_up()?;
                }
                Err(RecvError::Closed) => return Ok(self.summary(None)),
            }
        }
    }

    /// Apply one event. Returns the outcome once the rendered turn closes.
    pub fn handle(&mut self, event: &TranscriptEvent) -> io::Result<Option<TurnOutcome>> {
        match event {
            TranscriptEvent::TurnAppended {
                index,
                role: Role::Assistant,
            } => {
                self.start(*index)?;
                Ok(None)
            }
            TranscriptEvent::TurnAppended {
                role: Role::User, ..
            } => Ok(None),
            TranscriptEvent::TurnExtended { index, delta } => {
                if !self.is_target(*index)? {
                    return Ok(None);
                }
                if self.resync {
                    self.catch_up()?;
                } else {
                    self.out.write_all(delta.as_bytes())?;
                    self.printed += delta.len();
                    self.out.flush()?;
                }
                Ok(None)
            }
            TranscriptEvent::TurnClosed { index, outcome } => {
                if !self.is_target(*index)? {
                    return Ok(None);
                }
                if self.resync {
                    self.catch_up()?;
                }
                self.finish(outcome)?;
                Ok(Some(outcome.clone()))
            }
        }
    }

    /// Consume the renderer, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn summary(&self, outcome: Option<TurnOutcome>) -> RenderSummary {
        RenderSummary {
            index: self.target,
            outcome,
            lagged: self.lagged,
        }
    }

    fn start(&mut self, index: usize) -> io::Result<()> {
        self.target = Some(index);
        self.printed = 0;
        if let Some(label) = &self.label {
            write!(self.out, "\n  {label} ")?;
        }
        self.out.flush()
    }

    /// Whether `index` is the turn being rendered, adopting it if none is yet.
    fn is_target(&mut self, index: usize) -> io::Result<bool> {
        match self.target {
            Some(target) => Ok(target == index),
            None => {
                self.start(index)?;
                Ok(true)
            }
        }
    }

    fn adopt_open_turn(&mut self) -> io::Result<()> {
        if self.target.is_none() {
            if let Some(index) = self.store.snapshot().open {
                self.start(index)?;
            }
        }
        Ok(())
    }

    /// Write whatever part of the target turn has not been written yet.
    fn catch_up(&mut self) -> io::Result<()> {
        let Some(index) = self.target else {
            return Ok(());
        };
        let snapshot = self.store.snapshot();
        let Some(turn) = snapshot.turns.get(index) else {
            return Ok(());
        };
        if let Some(rest) = turn.content.get(self.printed..) {
            if !rest.is_empty() {
                self.out.write_all(rest.as_bytes())?;
                self.out.flush()?;
            }
        }
        self.printed = turn.content.len();
        Ok(())
    }

    fn finish(&mut self, outcome: &TurnOutcome) -> io::Result<()> {
        writeln!(self.out)?;
        match outcome {
            TurnOutcome::Completed => {}
            TurnOutcome::Failed { reason } => {
                writeln!(
                    self.out,
                    "  {} Reply interrupted: {reason}",
                    style("!").red().bold()
                )?;
                writeln!(
                    self.out,
                    "  {}",
                    style("Send another message to retry.").dim()
                )?;
            }
            TurnOutcome::Cancelled => {
                writeln!(self.out, "  {}", style("(reply cancelled)").yellow())?;
            }
        }
        self.out.flush()
    }
}
