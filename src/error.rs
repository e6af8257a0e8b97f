//! Pipeline-level error types.
//!
//! Only non-recoverable conditions surface here. Malformed model output is
//! recovered locally with an empty result, rate limits are retried, and
//! timeouts skip the affected batch. None of those become a `PipelineError`.

use thiserror::Error;

use crate::completion::CompletionError;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Non-recoverable completion failure (auth, transport, HTTP error).
    #[error("Completion call failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Review input error: {0}")]
    ReviewInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
