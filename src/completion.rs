//! Completion collaborator boundary.
//!
//! The pipeline never talks to a model provider directly; every stage goes
//! through `CompletionClient`, so tests script responses and the concrete
//! HTTP client stays swappable.

use thiserror::Error;

/// Failure taxonomy for one completion call. The executor maps these onto the
/// run-level policy: rate limits are retried, timeouts skip the batch,
/// everything else aborts the run.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Rate limited by the completion provider")]
    RateLimited,

    #[error("Completion request timed out after {0}s")]
    Timeout(u64),

    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("Completion provider returned error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl CompletionError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// One completion request. The pipeline always asks for a deterministic low
/// temperature and, for extraction/consolidation, structured JSON output.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub prompt: &'a str,
    pub temperature: f32,
    /// Request JSON output mode. A soft contract: the response text is
    /// still parsed defensively.
    pub json_output: bool,
}

/// Raw completion result with token accounting for cost computation.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl CompletionResponse {
    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// A text-completion provider. One in-flight request at a time per run;
/// implementations only need interior synchronization for their own state.
pub trait CompletionClient: Send + Sync {
    fn complete(&self, request: &CompletionRequest<'_>)
        -> Result<CompletionResponse, CompletionError>;
}
