//! Core types for the review insight pipeline.
//!
//! These types model the full lifecycle:
//! Review set → Batches → Per-batch insights → Merged insights → Consolidated result.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════
// Review (pipeline input)
// ═══════════════════════════════════════════

/// A single customer review, produced by the import step.
/// Immutable once parsed; reviews with empty content are filtered upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub content: String,
    /// Star rating 0–5; 0.0 means the source row carried no rating.
    #[serde(default)]
    pub rating: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Review {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            rating: 0.0,
            title: None,
        }
    }
}

// ═══════════════════════════════════════════
// Insight & CategoryInsights (exchange structure)
// ═══════════════════════════════════════════

/// A quote-backed, pattern-labeled observation extracted for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Verbatim source quotes. Logically a set: deduplicated on merge,
    /// first-seen order preserved for determinism.
    #[serde(default)]
    pub quotes: Vec<String>,
    /// Free-text explanation of the observation.
    #[serde(default)]
    pub context: String,
    /// Short label, ideally 5-10 words. Drives the similarity predicate.
    #[serde(default)]
    pub pattern: String,
}

/// The insights extracted for one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightGroup {
    #[serde(default)]
    pub insights: Vec<Insight>,
}

/// Category name → insights. The universal exchange structure between every
/// pipeline stage. Within one value, no two insights in the same category are
/// similar per the merge predicate. The merger enforces this additively, the
/// consolidator re-tightens it semantically.
///
/// Backed by a `BTreeMap` so category iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryInsights(pub BTreeMap<String, InsightGroup>);

impl CategoryInsights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|g| g.insights.is_empty())
    }

    /// Total insight count across all categories.
    pub fn total_insights(&self) -> usize {
        self.0.values().map(|g| g.insights.len()).sum()
    }

    pub fn insight_count(&self, category: &str) -> usize {
        self.0.get(category).map_or(0, |g| g.insights.len())
    }

    pub fn get(&self, category: &str) -> Option<&InsightGroup> {
        self.0.get(category)
    }

    pub fn entry(&mut self, category: &str) -> &mut InsightGroup {
        self.0.entry(category.to_string()).or_default()
    }

    pub fn insert(&mut self, category: impl Into<String>, group: InsightGroup) {
        self.0.insert(category.into(), group);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &InsightGroup)> {
        self.0.iter()
    }

    pub fn categories(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

// ═══════════════════════════════════════════
// Progress reporting
// ═══════════════════════════════════════════

/// Pipeline phase labels used in progress snapshots and run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Batching,
    ExecutingBatch,
    RateLimitedRetry,
    IntermediateConsolidation,
    FinalConsolidation,
    Complete,
    Aborted,
    Failed,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Batching => "batching",
            Self::ExecutingBatch => "executing_batch",
            Self::RateLimitedRetry => "rate_limited_retry",
            Self::IntermediateConsolidation => "intermediate_consolidation",
            Self::FinalConsolidation => "final_consolidation",
            Self::Complete => "complete",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ephemeral progress snapshot emitted to the optional sink.
/// Each snapshot carries cumulative counters: consumers treat it as a full
/// picture of the run so far, never as a delta.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingUpdate {
    pub current_batch: u32,
    pub total_batches: u32,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews_processed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_reviews: Option<u32>,
}

// ═══════════════════════════════════════════
// Run report
// ═══════════════════════════════════════════

/// Terminal status of a run. Cancellation is a distinct non-error outcome;
/// fatal errors surface as `Err(PipelineError)` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Complete,
    /// Cancelled by the caller. The report still carries the partial
    /// merged insights accumulated before cancellation was observed.
    Aborted,
}

/// Result of a full pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub status: RunStatus,
    pub insights: CategoryInsights,
    pub tokens_used: u64,
    pub cost: f64,
    pub reviews_processed: u32,
    pub total_reviews: u32,
    pub batches_total: u32,
    /// Recoverable per-batch failures (timeouts) that were skipped over.
    pub batch_errors: Vec<String>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub duration_ms: u64,
}

// ═══════════════════════════════════════════
// Cancellation
// ═══════════════════════════════════════════

/// Cooperative cancellation flag, checked at batch/chunk/category boundaries.
/// An in-flight completion call is never interrupted; its result is simply
/// discarded once cancellation is observed at the next boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The current unit of work completes,
    /// but no new work is started.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
