//! `ask` — one-shot question from the terminal.
//!
//! Runs the same pipeline as the gateway and prints the paced reveal
//! incrementally: each stream item is a growing prefix, so only the delta
//! since the previous item goes to the terminal.

use std::io::Write;

use futures::StreamExt;
use futures::stream::BoxStream;

use logseek_config::AppConfig;
use logseek_core::Transcript;

pub async fn run(message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    let table = super::load_table(&config).await;
    let orchestrator = super::build_orchestrator(&config, &table)?;

    let mut transcript = Transcript::new(config.chat.max_turns);
    let stream = orchestrator.handle(message, &mut transcript).await?;

    let mut stdout = std::io::stdout();
    drain(stream, &mut stdout).await?;
    Ok(())
}

/// Write a prefix stream as incremental deltas, newline-terminated.
async fn drain(
    mut stream: BoxStream<'static, String>,
    out: &mut impl Write,
) -> std::io::Result<String> {
    let mut shown = String::new();
    while let Some(prefix) = stream.next().await {
        write!(out, "{}", &prefix[shown.len()..])?;
        out.flush()?;
        shown = prefix;
    }
    writeln!(out)?;
    Ok(shown)
}
