//! Error types for the LogSeek domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all LogSeek operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Query engine errors ---
    #[error("Query engine error: {0}")]
    Engine(#[from] EngineError),

    // --- Dataset errors ---
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the natural-language query engine.
///
/// Every remote call is attempt-once: the caller decides how to surface a
/// failure, there is no retry or fallback answer inside the core.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("Engine unreachable: {0}")]
    Unavailable(String),

    #[error("Engine call exceeded the {limit_secs}s deadline")]
    Timeout { limit_secs: u64 },

    #[error("Engine rejected the query: {0}")]
    MalformedQuery(String),

    #[error("Engine API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Engine authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limited by engine, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// Failures while fetching or assembling the dataset.
///
/// All of these are downgraded to an empty table at the loader boundary;
/// they exist so the downgrade can be logged with a precise cause.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Invalid storage connection string: {0}")]
    BadConnectionString(String),

    #[error("Storage connection failed: {0}")]
    Connection(String),

    #[error("Container listing failed: {0}")]
    Listing(String),

    #[error("Fragment download failed for '{blob}': {reason}")]
    Download { blob: String, reason: String },

    #[error("Fragment deserialization failed for '{blob}': {reason}")]
    Deserialize { blob: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_displays_status() {
        let err = Error::Engine(EngineError::ApiError {
            status_code: 503,
            message: "backend overloaded".into(),
        });
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("backend overloaded"));
    }

    #[test]
    fn timeout_error_displays_deadline() {
        let err = EngineError::Timeout { limit_secs: 30 };
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn dataset_error_names_blob() {
        let err = Error::Dataset(DatasetError::Deserialize {
            blob: "frag-0001.json".into(),
            reason: "unexpected end of input".into(),
        });
        assert!(err.to_string().contains("frag-0001.json"));
    }
}
