//! profchat CLI entry point.
//!
//! Binary name: `profchat`
//!
//! Parses CLI arguments, sets up tracing, loads configuration, wires the
//! services, then dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = profchat_observe::verbosity_filter(cli.quiet, cli.verbose);
    if let Err(e) = profchat_observe::init_tracing(filter, cli.otel) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let result = run(cli).await;
    profchat_observe::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = profchat_infra::config::load_config(cli.config.as_deref()).await;
    let state = AppState::init(config)?;

    match cli.command {
        Commands::Chat => {
            cli::chat::loop_runner::run_chat_loop(&state).await?;
        }

        Commands::Ask { message } => {
            cli::ask::ask(&state, &message.join(" "), cli.json).await?;
        }

        Commands::Insights { name } => {
            cli::insights::show_insights(&state, &name.join(" "), cli.json).await?;
        }

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "profchat", &mut std::io::stdout());
        }
    }

    Ok(())
}
