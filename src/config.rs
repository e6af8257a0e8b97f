//! Pipeline configuration and model pricing.
//!
//! Every heuristic tunable lives here: similarity threshold, consolidation
//! density targets, backoff and delay durations, per-model pricing. The
//! thresholds are empirically tuned values with no deeper rationale, so they
//! stay configurable rather than hard-coded at use sites.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════
// Pricing
// ═══════════════════════════════════════════

/// Per-million-token pricing for one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelRates {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl ModelRates {
    /// Cost of one call: `prompt_tokens × input_rate + completion_tokens × output_rate`.
    pub fn cost(&self, prompt_tokens: u32, completion_tokens: u32) -> f64 {
        f64::from(prompt_tokens) * self.input_per_million / 1_000_000.0
            + f64::from(completion_tokens) * self.output_per_million / 1_000_000.0
    }
}

// ═══════════════════════════════════════════
// Similarity tuning
// ═══════════════════════════════════════════

/// Tunables for the token-overlap similarity predicate used by the merger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilaritySettings {
    /// Tokens must be strictly longer than this to count toward overlap.
    pub min_token_len: usize,
    /// Shared-token count must reach this fraction of the smaller pattern's
    /// token count for two insights to be considered the same finding.
    pub overlap_ratio: f32,
}

impl Default for SimilaritySettings {
    fn default() -> Self {
        Self {
            min_token_len: 3,
            overlap_ratio: 0.5,
        }
    }
}

// ═══════════════════════════════════════════
// Pipeline settings
// ═══════════════════════════════════════════

/// Configuration for a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Low-cost model used for per-batch extraction.
    pub extraction_model: String,
    /// Higher-capability model used for the consolidation pass.
    pub consolidation_model: String,
    pub extraction_rates: ModelRates,
    pub consolidation_rates: ModelRates,
    /// Deterministic low temperature for every call.
    pub temperature: f32,
    /// Reviews per batch.
    pub batch_size: usize,
    /// Batches processed per orchestrator round-trip in chunked runs.
    pub chunk_size: usize,
    /// Accumulated batch results that trigger an intermediate consolidation.
    pub intermediate_consolidation_threshold: usize,
    /// Runs with at most this many batches use the single-pass strategy;
    /// larger runs switch to chunked execution with intermediate consolidation.
    pub single_pass_max_batches: usize,
    /// Wait before retrying the same batch after a rate-limit signal.
    pub rate_limit_backoff: Duration,
    /// Rate-limit retries per batch before the run is treated as failed.
    pub max_rate_limit_retries: u32,
    /// Fixed pause between batches to reduce rate-limit pressure.
    pub inter_batch_delay: Duration,
    pub similarity: SimilaritySettings,
    /// Categories with at most this many insights skip consolidation.
    pub consolidation_skip_threshold: usize,
    /// Merged structures up to this many insights consolidate in one global
    /// call; larger structures consolidate category by category.
    pub global_consolidation_max: usize,
    /// Target insight density per category after consolidation.
    pub consolidation_target_min: usize,
    pub consolidation_target_max: usize,
    /// Fixed category labels the extraction prompt asks for.
    pub categories: Vec<String>,
}

/// Default category labels for consumer-product review sets.
pub fn default_categories() -> Vec<String> {
    [
        "Product Quality Issues",
        "Shipping & Delivery",
        "Customer Service",
        "Value for Money",
        "Usability & Features",
        "Positive Highlights",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            extraction_model: "gemini-2.5-flash".to_string(),
            consolidation_model: "gemini-2.5-pro".to_string(),
            extraction_rates: ModelRates {
                input_per_million: 0.30,
                output_per_million: 2.50,
            },
            consolidation_rates: ModelRates {
                input_per_million: 1.25,
                output_per_million: 10.00,
            },
            temperature: 0.2,
            batch_size: 100,
            chunk_size: 5,
            intermediate_consolidation_threshold: 10,
            single_pass_max_batches: 5,
            rate_limit_backoff: Duration::from_secs(8),
            max_rate_limit_retries: 3,
            inter_batch_delay: Duration::from_millis(500),
            similarity: SimilaritySettings::default(),
            consolidation_skip_threshold: 3,
            global_consolidation_max: 30,
            consolidation_target_min: 3,
            consolidation_target_max: 7,
            categories: default_categories(),
        }
    }
}

impl PipelineSettings {
    /// Settings with all delays zeroed, for tests and dry runs.
    pub fn without_delays(mut self) -> Self {
        self.rate_limit_backoff = Duration::ZERO;
        self.inter_batch_delay = Duration::ZERO;
        self
    }
}
