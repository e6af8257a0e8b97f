//! insightmill: batch extraction and consolidation of customer-review
//! insights through an LLM completion API.
//!
//! The library is organized around a single synchronous pipeline: reviews
//! are split into batches, each batch goes through one extraction
//! completion, the per-batch results are progressively merged, and a final
//! consolidation pass deduplicates across the whole run. See
//! [`pipeline::Orchestrator`] for the entry point; [`gemini::GeminiClient`]
//! is the production [`completion::CompletionClient`] implementation.

pub mod completion;
pub mod config;
pub mod error;
pub mod gemini;
pub mod pipeline;
pub mod types;

pub use completion::{CompletionClient, CompletionError, CompletionRequest, CompletionResponse};
pub use config::PipelineSettings;
pub use error::PipelineError;
pub use pipeline::Orchestrator;
pub use types::{
    CancelToken, CategoryInsights, Insight, ProcessingUpdate, Review, RunReport, RunStatus,
};

/// Default log filter when `INSIGHTMILL_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "insightmill=info"
}
