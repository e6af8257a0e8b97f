//! Per-batch execution: prompt assembly, completion call, defensive parse,
//! token/cost accounting, and the rate-limit retry wrapper.

use crate::completion::{CompletionClient, CompletionError, CompletionRequest};
use crate::config::PipelineSettings;
use crate::pipeline::{parser, prompt};
use crate::types::{CategoryInsights, Review};

/// Result of executing one batch.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub insights: CategoryInsights,
    pub tokens_used: u32,
    pub cost: f64,
}

/// Executes one batch at a time against the extraction model.
pub struct BatchExecutor<'a> {
    client: &'a dyn CompletionClient,
    settings: &'a PipelineSettings,
}

impl<'a> BatchExecutor<'a> {
    pub fn new(client: &'a dyn CompletionClient, settings: &'a PipelineSettings) -> Self {
        Self { client, settings }
    }

    /// Execute one batch once. Malformed or non-JSON output contributes an
    /// empty `CategoryInsights` instead of failing, since a single bad batch
    /// must not abort the run. Transport-level failures propagate to the caller,
    /// which owns the retry/skip policy.
    pub fn execute_batch(
        &self,
        batch: &[Review],
        template: &str,
    ) -> Result<BatchOutput, CompletionError> {
        let prompt_text =
            prompt::build_extraction_prompt(template, batch, &self.settings.categories);
        let request = CompletionRequest {
            model: &self.settings.extraction_model,
            system: prompt::EXTRACTION_SYSTEM,
            prompt: &prompt_text,
            temperature: self.settings.temperature,
            json_output: true,
        };

        let response = self.client.complete(&request)?;

        let insights = match parser::parse_category_insights(&response.text) {
            Some(parsed) => parsed,
            None => {
                tracing::warn!(
                    reviews = batch.len(),
                    "Extraction output undecodable, batch contributes empty result"
                );
                CategoryInsights::new()
            }
        };

        Ok(BatchOutput {
            insights,
            tokens_used: response.total_tokens(),
            cost: self
                .settings
                .extraction_rates
                .cost(response.prompt_tokens, response.completion_tokens),
        })
    }

    /// Execute a batch, retrying the same batch after a backoff whenever the
    /// provider signals a rate limit. `on_rate_limit` fires before each wait
    /// so the orchestrator can surface a progress snapshot. Retries are
    /// capped; an exhausted cap escalates the rate limit to the caller.
    pub fn execute_with_retry(
        &self,
        batch: &[Review],
        template: &str,
        on_rate_limit: &mut dyn FnMut(u32),
    ) -> Result<BatchOutput, CompletionError> {
        let mut attempt: u32 = 0;
        loop {
            match self.execute_batch(batch, template) {
                Err(CompletionError::RateLimited)
                    if attempt < self.settings.max_rate_limit_retries =>
                {
                    attempt += 1;
                    on_rate_limit(attempt);
                    tracing::info!(
                        attempt,
                        backoff_ms = self.settings.rate_limit_backoff.as_millis() as u64,
                        "Rate limited, waiting before retrying the same batch"
                    );
                    std::thread::sleep(self.settings.rate_limit_backoff);
                }
                other => return other,
            }
        }
    }
}
