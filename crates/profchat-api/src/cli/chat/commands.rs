//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and provide in-chat controls: help, transcript
//! history, professor insights, and leaving the session.

use std::io::{self, Write};

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Show the transcript so far.
    History,
    /// Look up sentiment and rating trends for a professor.
    Insights(String),
    /// Unknown or malformed command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (trimmed, ""),
    };

    match cmd.to_lowercase().as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/history" => Some(ChatCommand::History),
        "/insights" | "/prof" => {
            if arg.is_empty() {
                Some(ChatCommand::Unknown(
                    "/insights requires a professor name".to_string(),
                ))
            } else {
                Some(ChatCommand::Insights(arg.to_string()))
            }
        }
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Write the help text listing all available commands.
pub fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {}", style("Available commands:").bold())?;
    writeln!(out)?;
    writeln!(out, "  {}            {}", style("/help").cyan(), "Show this help message")?;
    writeln!(out, "  {}         {}", style("/history").cyan(), "Show the conversation so far")?;
    writeln!(
        out,
        "  {} {}",
        style("/insights <name>").cyan(),
        "Review sentiment and rating trends for a professor"
    )?;
    writeln!(out, "  {}           {}", style("/clear").cyan(), "Clear the screen")?;
    writeln!(out, "  {}            {}", style("/exit").cyan(), "End the chat session")?;
    writeln!(out)?;
    writeln!(
        out,
        "  {}",
        style("Ctrl+C stops a streaming reply, Ctrl+D exits").dim()
    )?;
    writeln!(out)
}
