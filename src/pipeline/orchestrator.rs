//! Drives the pipeline end to end:
//! reviews → batches → per-batch extraction → progressive merge →
//! consolidation → final result.
//!
//! Batches run strictly sequentially, one in-flight completion call at a
//! time, so the rate-limit retry policy holds and merge order stays
//! deterministic enough to test. Cancellation is cooperative, observed only
//! at chunk and category boundaries.

use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::completion::CompletionClient;
use crate::config::PipelineSettings;
use crate::error::PipelineError;
use crate::pipeline::batcher;
use crate::pipeline::consolidate::Consolidator;
use crate::pipeline::executor::BatchExecutor;
use crate::pipeline::merge;
use crate::types::{
    CancelToken, CategoryInsights, ProcessingUpdate, Review, RunPhase, RunReport, RunStatus,
};

/// How a run is executed, selected by volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// One end-to-end pass over every batch, then one final consolidation.
    SinglePass,
    /// Fixed number of batches per round-trip with intermediate
    /// consolidations to bound accumulator growth. Keeps each unit of work
    /// under the host's execution-time ceiling.
    Chunked,
}

/// Per-run accumulator state. Owned exclusively by the orchestrator's
/// sequential path; concurrent runs never share one.
#[derive(Debug, Clone)]
struct RunContext {
    total_batches: u32,
    total_reviews: u32,
    tokens_used: u64,
    cost: f64,
    reviews_processed: u32,
}

impl RunContext {
    fn new(total_reviews: u32, total_batches: u32) -> Self {
        Self {
            total_batches,
            total_reviews,
            tokens_used: 0,
            cost: 0.0,
            reviews_processed: 0,
        }
    }

    fn record_batch(&mut self, reviews: u32, tokens: u32, cost: f64) {
        self.reviews_processed += reviews;
        self.record_usage(tokens, cost);
    }

    fn record_usage(&mut self, tokens: u32, cost: f64) {
        self.tokens_used += u64::from(tokens);
        self.cost += cost;
    }

    /// Full progress snapshot with cumulative counters.
    fn snapshot(&self, current_batch: u32, status: impl Into<String>) -> ProcessingUpdate {
        ProcessingUpdate {
            current_batch,
            total_batches: self.total_batches,
            status: status.into(),
            tokens_used: Some(self.tokens_used),
            estimated_cost: Some(self.cost),
            reviews_processed: Some(self.reviews_processed),
            total_reviews: Some(self.total_reviews),
        }
    }
}

fn emit(progress: Option<&dyn Fn(ProcessingUpdate)>, update: ProcessingUpdate) {
    if let Some(sink) = progress {
        sink(update);
    }
}

/// Orchestrates one insight-extraction run.
pub struct Orchestrator<'a> {
    client: &'a dyn CompletionClient,
    settings: PipelineSettings,
}

impl<'a> Orchestrator<'a> {
    pub fn new(client: &'a dyn CompletionClient, settings: PipelineSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Strategy selection: small runs go single-pass, larger runs switch to
    /// chunked execution with intermediate consolidation.
    pub fn select_strategy(&self, batch_count: usize) -> ExecutionStrategy {
        if batch_count <= self.settings.single_pass_max_batches {
            ExecutionStrategy::SinglePass
        } else {
            ExecutionStrategy::Chunked
        }
    }

    /// Run the full pipeline over a review set.
    ///
    /// Returns `Ok` with a `Complete` or `Aborted` report; only
    /// non-recoverable failures (auth, transport, exhausted rate-limit
    /// retries) surface as `Err`. An aborted or consolidation-degraded run
    /// still carries every insight accumulated so far; late-stage failures
    /// never drop the run's work.
    pub fn run(
        &self,
        reviews: &[Review],
        template: &str,
        progress: Option<&dyn Fn(ProcessingUpdate)>,
        cancel: &CancelToken,
    ) -> Result<RunReport, PipelineError> {
        if self.settings.batch_size == 0 {
            return Err(PipelineError::Config("batch_size must be at least 1".into()));
        }
        if self.settings.chunk_size == 0 {
            return Err(PipelineError::Config("chunk_size must be at least 1".into()));
        }

        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let start = Instant::now();

        let batches = batcher::create_batches(reviews, self.settings.batch_size);
        let total_batches = batches.len() as u32;
        let strategy = self.select_strategy(batches.len());

        tracing::info!(
            run_id = %run_id,
            reviews = reviews.len(),
            batches = total_batches,
            strategy = ?strategy,
            "Insight extraction run starting"
        );

        let mut ctx = RunContext::new(reviews.len() as u32, total_batches);
        emit(progress, ctx.snapshot(0, RunPhase::Batching.as_str()));

        let executor = BatchExecutor::new(self.client, &self.settings);
        let consolidator = Consolidator::new(self.client, &self.settings);

        let mut accumulated = CategoryInsights::new();
        let mut batch_errors: Vec<String> = Vec::new();
        let mut results_since_consolidation = 0usize;
        let mut aborted = false;

        let chunk_len = match strategy {
            ExecutionStrategy::SinglePass => batches.len().max(1),
            ExecutionStrategy::Chunked => self.settings.chunk_size,
        };

        for (i, batch) in batches.iter().enumerate() {
            let batch_no = (i + 1) as u32;

            // Chunk boundary: the only place new batch work can be refused
            if i % chunk_len == 0 && cancel.is_cancelled() {
                aborted = true;
                break;
            }

            emit(progress, ctx.snapshot(batch_no, RunPhase::ExecutingBatch.as_str()));

            let outcome = executor.execute_with_retry(batch, template, &mut |attempt| {
                emit(
                    progress,
                    ctx.snapshot(batch_no, format!("rate_limited_retry (attempt {attempt})")),
                );
            });

            match outcome {
                Ok(output) => {
                    merge::merge_into(&mut accumulated, &output.insights, &self.settings.similarity);
                    ctx.record_batch(batch.len() as u32, output.tokens_used, output.cost);
                    results_since_consolidation += 1;
                    emit(progress, ctx.snapshot(batch_no, "batch_complete"));
                }
                Err(e) if e.is_timeout() => {
                    tracing::warn!(
                        run_id = %run_id,
                        batch = batch_no,
                        error = %e,
                        "Batch timed out, continuing without its contribution"
                    );
                    batch_errors.push(format!("Batch {batch_no}: {e}"));
                    emit(progress, ctx.snapshot(batch_no, "batch_skipped"));
                }
                Err(e) => {
                    tracing::error!(run_id = %run_id, batch = batch_no, error = %e, "Fatal completion failure");
                    emit(progress, ctx.snapshot(batch_no, RunPhase::Failed.as_str()));
                    return Err(e.into());
                }
            }

            // Intermediate consolidation at chunk boundaries keeps the
            // accumulator (and the next consolidation payload) bounded.
            let at_chunk_end = (i + 1) % chunk_len == 0;
            let is_last = i + 1 == batches.len();
            if strategy == ExecutionStrategy::Chunked
                && at_chunk_end
                && !is_last
                && results_since_consolidation >= self.settings.intermediate_consolidation_threshold
            {
                emit(
                    progress,
                    ctx.snapshot(batch_no, RunPhase::IntermediateConsolidation.as_str()),
                );
                let output = consolidator.consolidate(&accumulated, None, cancel);
                accumulated = output.insights;
                ctx.record_usage(output.tokens_used, output.cost);
                results_since_consolidation = 0;
            }

            if !is_last && !self.settings.inter_batch_delay.is_zero() {
                std::thread::sleep(self.settings.inter_batch_delay);
            }
        }

        // Final consolidation is also a cancellation boundary
        if !aborted && cancel.is_cancelled() {
            aborted = true;
        }

        if aborted {
            tracing::info!(
                run_id = %run_id,
                reviews_processed = ctx.reviews_processed,
                "Run aborted by user, returning partial merged results"
            );
            emit(progress, ctx.snapshot(total_batches, "aborted by user"));
            return Ok(build_report(
                run_id,
                RunStatus::Aborted,
                accumulated,
                &ctx,
                batch_errors,
                started_at,
                start.elapsed().as_millis() as u64,
            ));
        }

        emit(
            progress,
            ctx.snapshot(total_batches, RunPhase::FinalConsolidation.as_str()),
        );

        let category_base = ctx.clone();
        let on_category = |category: &str, tokens: u32, cost: f64| {
            // Fold in usage from earlier category calls in this pass so
            // snapshots stay cumulative
            let mut snapshot_ctx = category_base.clone();
            snapshot_ctx.record_usage(tokens, cost);
            emit(
                progress,
                snapshot_ctx.snapshot(total_batches, format!("consolidating: {category}")),
            );
        };
        let output = consolidator.consolidate(&accumulated, Some(&on_category), cancel);
        ctx.record_usage(output.tokens_used, output.cost);

        emit(progress, ctx.snapshot(total_batches, RunPhase::Complete.as_str()));

        tracing::info!(
            run_id = %run_id,
            reviews_processed = ctx.reviews_processed,
            tokens_used = ctx.tokens_used,
            cost = ctx.cost,
            duration_ms = start.elapsed().as_millis() as u64,
            "Insight extraction run completed"
        );

        Ok(build_report(
            run_id,
            RunStatus::Complete,
            output.insights,
            &ctx,
            batch_errors,
            started_at,
            start.elapsed().as_millis() as u64,
        ))
    }
}

fn build_report(
    run_id: String,
    status: RunStatus,
    insights: CategoryInsights,
    ctx: &RunContext,
    batch_errors: Vec<String>,
    started_at: chrono::DateTime<Utc>,
    duration_ms: u64,
) -> RunReport {
    RunReport {
        run_id,
        status,
        insights,
        tokens_used: ctx.tokens_used,
        cost: ctx.cost,
        reviews_processed: ctx.reviews_processed,
        total_reviews: ctx.total_reviews,
        batches_total: ctx.total_batches,
        batch_errors,
        started_at,
        duration_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::completion::{CompletionError, CompletionRequest, CompletionResponse};
    use crate::pipeline::prompt::DEFAULT_EXTRACTION_TEMPLATE;

    /// Scripted client for end-to-end scenarios. Pops one result per call;
    /// can flip a cancel token after a given call to model mid-run
    /// cancellation.
    struct ScriptedClient {
        script: Mutex<Vec<Result<CompletionResponse, CompletionError>>>,
        calls: Mutex<u32>,
        cancel_after_call: Option<(u32, CancelToken)>,
    }

    impl ScriptedClient {
        fn new(script: Vec<Result<CompletionResponse, CompletionError>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: Mutex::new(0),
                cancel_after_call: None,
            }
        }

        fn cancelling_after(mut self, call: u32, token: CancelToken) -> Self {
            self.cancel_after_call = Some((call, token));
            self
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl CompletionClient for ScriptedClient {
        fn complete(
            &self,
            _request: &CompletionRequest<'_>,
        ) -> Result<CompletionResponse, CompletionError> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if let Some((after, token)) = &self.cancel_after_call {
                if *calls == *after {
                    token.cancel();
                }
            }
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                return Err(CompletionError::Transport("script exhausted".into()));
            }
            script.remove(0)
        }
    }

    fn ok(text: &str) -> Result<CompletionResponse, CompletionError> {
        Ok(CompletionResponse {
            text: text.to_string(),
            prompt_tokens: 100,
            completion_tokens: 50,
        })
    }

    fn insights_json(pattern: &str, quote: &str) -> String {
        format!(
            r#"{{"Product Quality Issues": {{"insights": [{{"quotes": ["{quote}"], "context": "Durability complaints", "pattern": "{pattern}"}}]}}}}"#
        )
    }

    fn make_reviews(n: usize) -> Vec<Review> {
        (0..n)
            .map(|i| Review {
                content: format!("Review text {i}"),
                rating: (i % 5) as f32 + 1.0,
                title: None,
            })
            .collect()
    }

    fn settings() -> PipelineSettings {
        PipelineSettings::default().without_delays()
    }

    #[test]
    fn run_250_reviews_with_one_rate_limit_retry_completes() {
        // 250 reviews at batch size 100 → 3 batches; batch 2 is rate limited
        // once, then succeeds on retry of the same batch.
        let client = ScriptedClient::new(vec![
            ok(&insights_json("Product breaks easily", "it broke")),
            Err(CompletionError::RateLimited),
            ok(&insights_json("Item breaks easily", "fell apart")),
            ok(&insights_json("Product breaks easily", "snapped in half")),
        ]);
        let orchestrator = Orchestrator::new(&client, settings());
        let reviews = make_reviews(250);

        let report = orchestrator
            .run(&reviews, DEFAULT_EXTRACTION_TEMPLATE, None, &CancelToken::new())
            .unwrap();

        assert_eq!(report.status, RunStatus::Complete);
        assert_eq!(report.reviews_processed, 250);
        assert_eq!(report.batches_total, 3);
        assert!(report.batch_errors.is_empty());
        // 3 batch calls + 1 retried call; merged volume stays below the
        // consolidation skip threshold so no consolidation call happens
        assert_eq!(client.call_count(), 4);
        // The three similar patterns collapse into one insight with all quotes
        assert_eq!(report.insights.insight_count("Product Quality Issues"), 1);
        let insight = &report.insights.get("Product Quality Issues").unwrap().insights[0];
        assert_eq!(insight.quotes.len(), 3);
    }

    #[test]
    fn invalid_json_batch_contributes_empty_and_run_completes() {
        let client = ScriptedClient::new(vec![
            ok(&insights_json("Product breaks easily", "it broke")),
            ok("This is not JSON at all, sorry!"),
        ]);
        let orchestrator = Orchestrator::new(&client, settings());
        let reviews = make_reviews(150); // 2 batches

        let report = orchestrator
            .run(&reviews, DEFAULT_EXTRACTION_TEMPLATE, None, &CancelToken::new())
            .unwrap();

        assert_eq!(report.status, RunStatus::Complete);
        // The malformed batch still advances the processed counter
        assert_eq!(report.reviews_processed, 150);
        assert!(report.batch_errors.is_empty());
        assert_eq!(report.insights.total_insights(), 1);
    }

    #[test]
    fn timeout_skips_batch_and_run_continues() {
        let client = ScriptedClient::new(vec![
            ok(&insights_json("Product breaks easily", "it broke")),
            Err(CompletionError::Timeout(300)),
            ok(&insights_json("Paint chips within days", "paint came off")),
        ]);
        let orchestrator = Orchestrator::new(&client, settings());
        let reviews = make_reviews(300); // 3 batches

        let updates: Mutex<Vec<ProcessingUpdate>> = Mutex::new(Vec::new());
        let sink = |update: ProcessingUpdate| updates.lock().unwrap().push(update);

        let report = orchestrator
            .run(&reviews, DEFAULT_EXTRACTION_TEMPLATE, Some(&sink), &CancelToken::new())
            .unwrap();

        assert_eq!(report.status, RunStatus::Complete);
        assert_eq!(report.batch_errors.len(), 1);
        assert!(report.batch_errors[0].contains("Batch 2"));
        // Skipped batch's reviews are not counted as processed
        assert_eq!(report.reviews_processed, 200);
        assert_eq!(report.insights.insight_count("Product Quality Issues"), 2);

        // The skip itself is surfaced to the sink, not just the report
        let updates = updates.lock().unwrap();
        let skipped = updates
            .iter()
            .find(|u| u.status == "batch_skipped")
            .expect("skip snapshot missing");
        assert_eq!(skipped.current_batch, 2);
        assert_eq!(skipped.reviews_processed, Some(100));
    }

    #[test]
    fn auth_failure_aborts_run() {
        let client = ScriptedClient::new(vec![Err(CompletionError::Auth("invalid key".into()))]);
        let orchestrator = Orchestrator::new(&client, settings());
        let reviews = make_reviews(100);

        let result =
            orchestrator.run(&reviews, DEFAULT_EXTRACTION_TEMPLATE, None, &CancelToken::new());

        match result {
            Err(PipelineError::Completion(CompletionError::Auth(msg))) => {
                assert!(msg.contains("invalid key"));
            }
            other => panic!("Expected fatal auth error, got {other:?}"),
        }
    }

    #[test]
    fn cancellation_before_chunk_2_returns_partial_results() {
        // 5 batches, 1 batch per chunk → 5 chunks. The token flips during
        // chunk 1's completion call, so chunk 1 finishes and chunk 2 never
        // starts.
        let cancel = CancelToken::new();
        let client = ScriptedClient::new(vec![
            ok(&insights_json("Product breaks easily", "it broke")),
            ok(&insights_json("Paint chips within days", "paint came off")),
        ])
        .cancelling_after(1, cancel.clone());

        let mut settings = settings();
        settings.batch_size = 1;
        settings.chunk_size = 1;
        settings.single_pass_max_batches = 1; // force chunked execution
        let orchestrator = Orchestrator::new(&client, settings);
        let reviews = make_reviews(5);

        let report = orchestrator
            .run(&reviews, DEFAULT_EXTRACTION_TEMPLATE, None, &cancel)
            .unwrap();

        assert_eq!(report.status, RunStatus::Aborted);
        assert_eq!(client.call_count(), 1, "no new work after cancellation");
        assert_eq!(report.reviews_processed, 1);
        // Partial merged results are returned, not dropped
        assert_eq!(report.insights.total_insights(), 1);
    }

    #[test]
    fn progress_snapshots_carry_cumulative_counters() {
        let client = ScriptedClient::new(vec![
            ok(&insights_json("Product breaks easily", "it broke")),
            ok(&insights_json("Paint chips within days", "paint came off")),
        ]);
        let orchestrator = Orchestrator::new(&client, settings());
        let reviews = make_reviews(200); // 2 batches

        let updates: Mutex<Vec<ProcessingUpdate>> = Mutex::new(Vec::new());
        let sink = |update: ProcessingUpdate| updates.lock().unwrap().push(update);

        let report = orchestrator
            .run(&reviews, DEFAULT_EXTRACTION_TEMPLATE, Some(&sink), &CancelToken::new())
            .unwrap();
        assert_eq!(report.status, RunStatus::Complete);

        let updates = updates.lock().unwrap();
        assert_eq!(updates.first().unwrap().status, "batching");
        assert_eq!(updates.last().unwrap().status, "complete");
        assert!(updates.iter().any(|u| u.status == "executing_batch"));
        assert!(updates.iter().any(|u| u.status == "batch_complete"));

        // Counters are cumulative and never decrease between snapshots
        let mut last_tokens = 0;
        let mut last_processed = 0;
        for update in updates.iter() {
            let tokens = update.tokens_used.unwrap();
            let processed = update.reviews_processed.unwrap();
            assert!(tokens >= last_tokens);
            assert!(processed >= last_processed);
            assert_eq!(update.total_reviews, Some(200));
            assert_eq!(update.total_batches, 2);
            last_tokens = tokens;
            last_processed = processed;
        }
        assert_eq!(last_processed, 200);
    }

    #[test]
    fn rate_limit_wait_emits_progress_snapshot() {
        let client = ScriptedClient::new(vec![
            Err(CompletionError::RateLimited),
            ok(&insights_json("Product breaks easily", "it broke")),
        ]);
        let orchestrator = Orchestrator::new(&client, settings());
        let reviews = make_reviews(50);

        let updates: Mutex<Vec<ProcessingUpdate>> = Mutex::new(Vec::new());
        let sink = |update: ProcessingUpdate| updates.lock().unwrap().push(update);

        orchestrator
            .run(&reviews, DEFAULT_EXTRACTION_TEMPLATE, Some(&sink), &CancelToken::new())
            .unwrap();

        let updates = updates.lock().unwrap();
        let retry = updates
            .iter()
            .find(|u| u.status.starts_with("rate_limited_retry"))
            .expect("rate limit snapshot missing");
        assert!(retry.status.contains("attempt 1"));
        // Progress did not advance during the wait
        assert_eq!(retry.reviews_processed, Some(0));
    }

    #[test]
    fn category_consolidation_snapshots_accumulate_usage() {
        // One batch yielding two dense categories, volume forced into
        // per-category consolidation mode. The second category's snapshot
        // must already include the first category's call usage.
        let group = |tag: &str| {
            (0..4)
                .map(|i| {
                    format!(
                        r#"{{"quotes": ["q{tag}{i}"], "context": "c", "pattern": "{tag}{i} topic{i} detail{i} label{i}"}}"#
                    )
                })
                .collect::<Vec<_>>()
                .join(",")
        };
        let extraction = format!(
            r#"{{"Alpha Findings": {{"insights": [{a}]}}, "Beta Findings": {{"insights": [{b}]}}}}"#,
            a = group("alpha"),
            b = group("beta"),
        );
        let consolidated_a = r#"{"Alpha Findings": {"insights": [
            {"quotes": ["qa"], "context": "c", "pattern": "Alpha issue consolidated here now"}
        ]}}"#;
        let consolidated_b = r#"{"Beta Findings": {"insights": [
            {"quotes": ["qb"], "context": "c", "pattern": "Beta issue consolidated here now"}
        ]}}"#;
        let client =
            ScriptedClient::new(vec![ok(&extraction), ok(consolidated_a), ok(consolidated_b)]);

        let mut settings = settings();
        settings.global_consolidation_max = 5; // force per-category mode
        let orchestrator = Orchestrator::new(&client, settings);
        let reviews = make_reviews(10);

        let updates: Mutex<Vec<ProcessingUpdate>> = Mutex::new(Vec::new());
        let sink = |update: ProcessingUpdate| updates.lock().unwrap().push(update);

        let report = orchestrator
            .run(&reviews, DEFAULT_EXTRACTION_TEMPLATE, Some(&sink), &CancelToken::new())
            .unwrap();
        assert_eq!(report.status, RunStatus::Complete);

        let updates = updates.lock().unwrap();
        let category_tokens: Vec<u64> = updates
            .iter()
            .filter(|u| u.status.starts_with("consolidating:"))
            .map(|u| u.tokens_used.unwrap())
            .collect();
        assert_eq!(category_tokens.len(), 2);
        assert_eq!(category_tokens[0], 150, "extraction usage only");
        assert_eq!(category_tokens[1], 450, "plus the first category's call");
    }

    #[test]
    fn chunked_run_emits_intermediate_consolidation() {
        let batch_response = insights_json("Product breaks easily", "it broke");
        let script: Vec<_> = (0..6).map(|_| ok(&batch_response)).collect();
        let client = ScriptedClient::new(script);

        let mut settings = settings();
        settings.batch_size = 1;
        settings.chunk_size = 2;
        settings.intermediate_consolidation_threshold = 2;
        settings.single_pass_max_batches = 1; // force chunked execution
        let orchestrator = Orchestrator::new(&client, settings);
        let reviews = make_reviews(6);

        let updates: Mutex<Vec<ProcessingUpdate>> = Mutex::new(Vec::new());
        let sink = |update: ProcessingUpdate| updates.lock().unwrap().push(update);

        let report = orchestrator
            .run(&reviews, DEFAULT_EXTRACTION_TEMPLATE, Some(&sink), &CancelToken::new())
            .unwrap();
        assert_eq!(report.status, RunStatus::Complete);

        let updates = updates.lock().unwrap();
        let intermediate = updates
            .iter()
            .filter(|u| u.status == "intermediate_consolidation")
            .count();
        assert_eq!(intermediate, 2, "chunks 1-2 and 3-4 trigger consolidation, the last chunk goes straight to final");
        assert!(updates.iter().any(|u| u.status == "final_consolidation"));
    }

    #[test]
    fn empty_review_set_completes_with_zero_batches() {
        let client = ScriptedClient::new(vec![]);
        let orchestrator = Orchestrator::new(&client, settings());

        let report = orchestrator
            .run(&[], DEFAULT_EXTRACTION_TEMPLATE, None, &CancelToken::new())
            .unwrap();

        assert_eq!(report.status, RunStatus::Complete);
        assert_eq!(report.batches_total, 0);
        assert!(report.insights.is_empty());
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn zero_batch_size_is_a_config_error() {
        let client = ScriptedClient::new(vec![]);
        let mut settings = settings();
        settings.batch_size = 0;
        let orchestrator = Orchestrator::new(&client, settings);

        let result =
            orchestrator.run(&make_reviews(10), DEFAULT_EXTRACTION_TEMPLATE, None, &CancelToken::new());
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn strategy_selection_by_volume() {
        let client = ScriptedClient::new(vec![]);
        let orchestrator = Orchestrator::new(&client, settings());
        assert_eq!(orchestrator.select_strategy(3), ExecutionStrategy::SinglePass);
        assert_eq!(orchestrator.select_strategy(5), ExecutionStrategy::SinglePass);
        assert_eq!(orchestrator.select_strategy(6), ExecutionStrategy::Chunked);
    }
}
