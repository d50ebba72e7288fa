//! Typed errors for the COI pipeline.

use thiserror::Error;

/// Errors that can occur during COI extraction and transformation.
#[derive(Debug, Error)]
pub enum CoiError {
    /// LLM call failed
    #[error("LLM error: {0}")]
    Llm(#[from] llm_client::LlmError),

    /// Document not found in store
    #[error("document not found: {key}")]
    DocumentNotFound { key: String },

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A category's precise output was not usable JSON
    #[error("unparseable {category} output: {reason}")]
    CategoryParse { category: String, reason: String },

    /// The share-name pass produced no series to align against
    #[error("no preferred share names extracted")]
    NoShareNames,

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV output error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for COI operations.
pub type Result<T> = std::result::Result<T, CoiError>;
