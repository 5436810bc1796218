//! Main chat loop orchestration.
//!
//! Reads user input, dispatches slash commands, and runs one exchange per
//! message. While a reply streams, input is still read so Ctrl+C can cancel
//! the exchange and Ctrl+D can end the session.

use std::io::Write;

use console::style;
use rustyline_async::SharedWriter;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span};

use profchat_core::chat::ExchangeOutcome;
use profchat_observe::attrs;
use profchat_types::chat::{Role, TranscriptSnapshot};
use profchat_types::error::ChatError;

use crate::cli::ask::opened_turn;
use crate::cli::insights::write_insights;
use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::TranscriptRenderer;

const HISTORY_PREVIEW_CHARS: usize = 100;

/// What the loop should do after an exchange.
enum AfterExchange {
    Continue,
    Exit,
}

/// Run the interactive chat loop.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let span = info_span!(attrs::SPAN_CHAT_SESSION);
    chat_loop(state).instrument(span).await
}

async fn chat_loop(state: &AppState) -> anyhow::Result<()> {
    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut input, mut writer) =
        ChatInput::new(prompt).map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    let greeting = state
        .store
        .snapshot()
        .turns
        .first()
        .map(|turn| turn.content.clone())
        .unwrap_or_default();
    print_welcome_banner(&mut writer, &state.config.chat.url, &greeting)?;

    loop {
        match input.read_line().await {
            InputEvent::Eof => {
                writeln!(writer, "\n  {}", style("Session ended.").dim())?;
                break;
            }
            InputEvent::Interrupted => {
                writeln!(
                    writer,
                    "  {}",
                    style("Press Ctrl+D to exit, or keep chatting.").dim()
                )?;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(&mut writer)?,
                        ChatCommand::Clear => input.clear()?,
                        ChatCommand::Exit => {
                            writeln!(writer, "\n  {}", style("Session ended.").dim())?;
                            break;
                        }
                        ChatCommand::History => {
                            write_history(&mut writer, &state.store.snapshot())?;
                        }
                        ChatCommand::Insights(name) => match state.analytics.lookup(&name).await {
                            Ok(insights) => write_insights(&mut writer, &insights)?,
                            Err(e) => writeln!(
                                writer,
                                "\n  {} Could not look up '{name}': {e}\n",
                                style("!").red().bold()
                            )?,
                        },
                        ChatCommand::Unknown(cmd_name) => writeln!(
                            writer,
                            "\n  {} Unknown command: {}. Type /help for available commands.\n",
                            style("?").yellow().bold(),
                            style(cmd_name).dim()
                        )?,
                    }
                    continue;
                }

                if let AfterExchange::Exit =
                    run_exchange(state, &mut input, &mut writer, &text).await?
                {
                    writeln!(writer, "\n  {}", style("Session ended.").dim())?;
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Submit `text` and stream the reply, watching input for Ctrl+C / Ctrl+D.
async fn run_exchange(
    state: &AppState,
    input: &mut ChatInput,
    writer: &mut SharedWriter,
    text: &str,
) -> anyhow::Result<AfterExchange> {
    let cancel = CancellationToken::new();
    let renderer = tokio::spawn(
        TranscriptRenderer::new(state.store.clone(), writer.clone()).run(state.store.subscribe()),
    );

    let exchange = state.chat.submit(text, &cancel);
    tokio::pin!(exchange);

    let mut after = AfterExchange::Continue;
    let result = loop {
        tokio::select! {
            result = &mut exchange => break result,
            event = input.read_line() => match event {
                InputEvent::Interrupted => cancel.cancel(),
                InputEvent::Eof => {
                    after = AfterExchange::Exit;
                    cancel.cancel();
                }
                InputEvent::Message(_) => writeln!(
                    writer,
                    "  {}",
                    style("Still replying; press Ctrl+C to stop it first.").dim()
                )?,
            },
        }
    };

    if opened_turn(&result) {
        let summary = renderer.await??;
        debug!(?summary, "Reply rendered");
    } else {
        renderer.abort();
    }

    match result {
        Ok(ExchangeOutcome::Completed { .. } | ExchangeOutcome::Cancelled { .. }) => {}
        Ok(ExchangeOutcome::Ignored) => {}
        // The renderer has already shown the failure on the closed turn.
        Err(ChatError::Transport { message }) => debug!(%message, "Exchange failed"),
        Err(e) => writeln!(writer, "\n  {} {e}\n", style("!").red().bold())?,
    }
    writeln!(writer)?;

    Ok(after)
}

/// Write the transcript with one preview line per turn.
fn write_history(out: &mut impl Write, snapshot: &TranscriptSnapshot) -> std::io::Result<()> {
    writeln!(out)?;
    for (index, turn) in snapshot.turns.iter().enumerate() {
        let label = match turn.role {
            Role::User => format!("{}", style("You").green()),
            Role::Assistant => format!("{}", style("Assistant").cyan()),
        };
        let marker = if snapshot.open == Some(index) {
            format!(" {}", style("(streaming)").dim())
        } else {
            String::new()
        };
        writeln!(
            out,
            "  {} {}{marker}",
            style(label).bold(),
            preview(&turn.content, HISTORY_PREVIEW_CHARS)
        )?;
    }
    writeln!(out)
}

/// First `max` characters of `text` on one line, with an ellipsis if cut.
fn preview(text: &str, max: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() > max {
        let cut: String = single_line.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        single_line
    }
}
