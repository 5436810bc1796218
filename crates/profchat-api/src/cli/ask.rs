//! `profchat ask <message>`: one exchange against a fresh transcript.

use std::io::{self, Write};

use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info_span};

use profchat_core::chat::ExchangeOutcome;
use profchat_observe::attrs;
use profchat_types::error::ChatError;

use crate::state::AppState;

use super::chat::renderer::TranscriptRenderer;

/// Send `message`, stream the reply to stdout, and exit non-zero on failure.
///
/// Ctrl+C cancels the reply; the partial text stays printed.
pub async fn ask(state: &AppState, message: &str, json: bool) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let renderer = (!json).then(|| {
        let rx = state.store.subscribe();
        tokio::spawn(
            TranscriptRenderer::new(state.store.clone(), io::stdout())
                .with_label(None)
                .run(rx),
        )
    });

    let interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let result = state
        .chat
        .submit(message, &cancel)
        .instrument(info_span!(attrs::SPAN_ASK))
        .await;
    watcher.abort();

    if let Some(handle) = renderer {
        if opened_turn(&result) {
            handle.await??;
        } else {
            handle.abort();
        }
    }

    if json {
        let reply = state
            .store
            .snapshot()
            .last()
            .map(|turn| turn.content.clone())
            .unwrap_or_default();
        let status = match &result {
            Ok(ExchangeOutcome::Completed { .. }) => "completed",
            Ok(ExchangeOutcome::Cancelled { .. }) => "cancelled",
            Ok(ExchangeOutcome::Ignored) => "ignored",
            Err(_) => "failed",
        };
        let mut body = json!({ "reply": reply, "status": status });
        if let Err(e) = &result {
            body["error"] = json!(e.to_string());
        }
        writeln!(io::stdout(), "{}", serde_json::to_string_pretty(&body)?)?;
    }

    match result? {
        ExchangeOutcome::Ignored => anyhow::bail!("message is empty"),
        ExchangeOutcome::Completed { .. } | ExchangeOutcome::Cancelled { .. } => Ok(()),
    }
}

/// Whether the exchange got far enough to append (and close) an assistant turn.
pub(crate) fn opened_turn(result: &Result<ExchangeOutcome, ChatError>) -> bool {
    match result {
        Ok(ExchangeOutcome::Ignored) => false,
        Ok(_) => true,
        Err(ChatError::Validation(_) | ChatError::ConcurrentExchange) => false,
        Err(ChatError::Transport { .. } | ChatError::NoOpenTurn) => true,
    }
}
