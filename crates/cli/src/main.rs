//! LogSeek CLI — the main entry point.
//!
//! Commands:
//! - `serve` — Start the HTTP chat gateway
//! - `ask`   — Ask a single question from the terminal

use clap::{Parser, Subcommand};
use tracing::error;

mod commands;

#[derive(Parser)]
#[command(
    name = "logseek",
    about = "LogSeek — conversational assistant over tabular log data",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP chat gateway
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question and print the streamed answer
    Ask {
        /// The question to ask
        message: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await,
        Commands::Ask { message } => commands::ask::run(&message).await,
    };

    // Startup and pipeline failures are logged, not panicked
    if let Err(e) = result {
        error!(error = %e, "Failed to run");
        std::process::exit(1);
    }
}
