//! Typed errors for the news pipeline.

use thiserror::Error;

/// Errors that can occur across the news pipeline stages.
#[derive(Debug, Error)]
pub enum NewsError {
    /// LLM call failed
    #[error("LLM error: {0}")]
    Llm(#[from] llm_client::LlmError),

    /// Search provider failed
    #[error("search error: {0}")]
    Search(String),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Queue operation failed
    #[error("queue error: {0}")]
    Queue(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for news pipeline operations.
pub type Result<T> = std::result::Result<T, NewsError>;
