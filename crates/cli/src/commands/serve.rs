//! `serve` — start the HTTP chat gateway.

use logseek_config::AppConfig;
use tracing::info;

/// Load config, build the pipeline, and serve until shutdown.
pub async fn run(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load()?;
    if let Some(port) = port {
        config.port = port;
    }

    info!(port = config.port, "Starting LogSeek");

    let table = super::load_table(&config).await;
    let orchestrator = super::build_orchestrator(&config, &table)?;

    logseek_gateway::start(&config, orchestrator).await
}
