//! QueryEngine trait — the abstraction over the natural-language answer
//! backend.
//!
//! An engine is configured once at startup with the unified table and is
//! immutable for process lifetime. The orchestrator calls `answer()` exactly
//! once per unmatched query without knowing which backend is behind it,
//! which also makes the routing layer trivially testable with a stub.

use async_trait::async_trait;

use crate::error::EngineError;

/// The core engine trait.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// A human-readable name for this engine (e.g., "azure-openai").
    fn name(&self) -> &str;

    /// Answer a natural-language question about the dataset.
    ///
    /// One attempt, no retry. Implementations are expected to enforce their
    /// own deadline and map transport and API failures to [`EngineError`].
    async fn answer(&self, question: &str) -> std::result::Result<String, EngineError>;

    /// Health check — can we reach the backend?
    async fn health_check(&self) -> std::result::Result<bool, EngineError> {
        Ok(true)
    }
}
