//! CLI command implementations.
//!
//! Both commands share the same startup pipeline: load config, pull the
//! dataset once (degrading to an empty table on failure), build the engine
//! against it, and wire the orchestrator.

pub mod ask;
pub mod serve;

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use logseek_agent::QueryOrchestrator;
use logseek_config::AppConfig;
use logseek_core::{DenyListFilter, LogTable};
use logseek_dataset::DatasetLoader;
use logseek_engine::AzureQueryEngine;

/// Load the unified table. Dataset problems never abort startup.
pub async fn load_table(config: &AppConfig) -> LogTable {
    match DatasetLoader::from_config(&config.storage) {
        Ok(loader) => loader.load().await,
        Err(e) => {
            error!(error = %e, "Storage configuration unusable, starting with an empty table");
            LogTable::empty()
        }
    }
}

/// Build the full query pipeline from config and the loaded table.
pub fn build_orchestrator(
    config: &AppConfig,
    table: &LogTable,
) -> Result<QueryOrchestrator, Box<dyn std::error::Error>> {
    let engine = AzureQueryEngine::new(&config.engine, table)?;

    let mut orchestrator = QueryOrchestrator::new(config.persona(), Arc::new(engine))
        .with_pacing(Duration::from_millis(config.chat.pacing_ms));

    if config.safety.enabled {
        let filter = if config.safety.reject_on_hit {
            DenyListFilter::rejecting(config.safety.deny_terms.clone())
        } else {
            DenyListFilter::new(config.safety.deny_terms.clone(), config.safety.mask.clone())
        };
        orchestrator = orchestrator.with_filter(Arc::new(filter));
    }

    info!(
        rows = table.row_count(),
        pacing_ms = config.chat.pacing_ms,
        "Query pipeline ready"
    );
    Ok(orchestrator)
}
