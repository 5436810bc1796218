//! Welcome banner display for chat sessions.

use std::io::{self, Write};

use console::style;

/// Write the welcome banner followed by the transcript's seed greeting.
pub fn print_welcome_banner(out: &mut impl Write, chat_url: &str, greeting: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {}", style("Rate My Professor assistant").cyan().bold())?;
    writeln!(out, "  {}  {}", style("Endpoint:").bold(), style(chat_url).dim())?;
    writeln!(out)?;
    writeln!(
        out,
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    )?;
    writeln!(out, "  {}", style("---").dim())?;
    writeln!(out)?;
    writeln!(out, "  {} {greeting}", style("Assistant").cyan().bold())?;
    writeln!(out)
}
