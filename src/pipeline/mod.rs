//! Review-insight extraction pipeline.
//!
//! Stage order: [`batcher`] splits the review set, [`executor`] runs one
//! extraction completion per batch, [`merge`] folds batch results into a
//! running accumulator, [`consolidate`] deduplicates across batches, and
//! [`orchestrator`] wires the stages together with progress reporting and
//! cooperative cancellation.

pub mod batcher;
pub mod consolidate;
pub mod executor;
pub mod merge;
pub mod orchestrator;
pub mod parser;
pub mod prompt;

pub use consolidate::{ConsolidationOutput, Consolidator};
pub use executor::{BatchExecutor, BatchOutput};
pub use orchestrator::{ExecutionStrategy, Orchestrator};
