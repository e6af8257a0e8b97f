//! Second-pass semantic consolidation of merged insights.
//!
//! The consolidation model deduplicates findings the token-overlap merge
//! heuristic could not, normalizes patterns, and translates non-English
//! quotes. It is a quality-improvement step only: any failure degrades to
//! passing the unconsolidated input through; consolidation never loses data.

use crate::completion::{CompletionClient, CompletionRequest};
use crate::config::PipelineSettings;
use crate::pipeline::{merge, parser, prompt};
use crate::types::{CancelToken, CategoryInsights};

/// Result of the consolidation pass.
#[derive(Debug, Clone)]
pub struct ConsolidationOutput {
    pub insights: CategoryInsights,
    pub tokens_used: u32,
    pub cost: f64,
}

impl ConsolidationOutput {
    /// Pass-through output with zero token/cost contribution.
    fn passthrough(insights: CategoryInsights) -> Self {
        Self {
            insights,
            tokens_used: 0,
            cost: 0.0,
        }
    }
}

/// Runs the consolidation pass against the consolidation model.
pub struct Consolidator<'a> {
    client: &'a dyn CompletionClient,
    settings: &'a PipelineSettings,
}

impl<'a> Consolidator<'a> {
    pub fn new(client: &'a dyn CompletionClient, settings: &'a PipelineSettings) -> Self {
        Self { client, settings }
    }

    /// Consolidate a merged structure. Sparse categories (at or below the
    /// skip threshold) pass through untouched. Dense categories consolidate
    /// in one global call when the total volume allows, otherwise category
    /// by category. `on_category` fires before each per-category call with
    /// the tokens and cost already consumed by earlier calls in this pass,
    /// so the caller can keep its cumulative counters current. Cancellation
    /// is honored at the same boundary, with remaining categories passed
    /// through unconsolidated.
    pub fn consolidate(
        &self,
        merged: &CategoryInsights,
        on_category: Option<&dyn Fn(&str, u32, f64)>,
        cancel: &CancelToken,
    ) -> ConsolidationOutput {
        let mut result = CategoryInsights::new();
        let mut dense = CategoryInsights::new();

        for (category, group) in merged.iter() {
            if group.insights.len() <= self.settings.consolidation_skip_threshold {
                result.insert(category.clone(), group.clone());
            } else {
                dense.insert(category.clone(), group.clone());
            }
        }

        if dense.is_empty() {
            tracing::debug!("No category dense enough to consolidate, passing through");
            return ConsolidationOutput::passthrough(result);
        }

        if dense.total_insights() <= self.settings.global_consolidation_max {
            self.consolidate_global(dense, result)
        } else {
            self.consolidate_per_category(dense, result, on_category, cancel)
        }
    }

    /// One call covering every dense category.
    fn consolidate_global(
        &self,
        dense: CategoryInsights,
        mut result: CategoryInsights,
    ) -> ConsolidationOutput {
        match self.consolidate_scope(&dense) {
            Some((consolidated, tokens_used, cost)) => {
                // Categories the model dropped keep their unconsolidated input
                for (category, group) in dense.iter() {
                    if consolidated.get(category).is_none() {
                        tracing::warn!(category = %category, "Consolidation dropped a category, restoring input");
                        result.insert(category.clone(), group.clone());
                    }
                }
                for (category, group) in consolidated.iter() {
                    result.insert(category.clone(), group.clone());
                }
                ConsolidationOutput {
                    insights: result,
                    tokens_used,
                    cost,
                }
            }
            None => {
                for (category, group) in dense.iter() {
                    result.insert(category.clone(), group.clone());
                }
                ConsolidationOutput::passthrough(result)
            }
        }
    }

    /// One call per dense category, used when a single global payload would
    /// be unreasonably large.
    fn consolidate_per_category(
        &self,
        dense: CategoryInsights,
        mut result: CategoryInsights,
        on_category: Option<&dyn Fn(&str, u32, f64)>,
        cancel: &CancelToken,
    ) -> ConsolidationOutput {
        let mut tokens_used: u32 = 0;
        let mut cost: f64 = 0.0;

        for (category, group) in dense.iter() {
            if cancel.is_cancelled() {
                tracing::info!(category = %category, "Cancellation observed, remaining categories pass through");
                result.insert(category.clone(), group.clone());
                continue;
            }

            if let Some(notify) = on_category {
                notify(category, tokens_used, cost);
            }

            let mut scope = CategoryInsights::new();
            scope.insert(category.clone(), group.clone());

            match self.consolidate_scope(&scope) {
                Some((consolidated, scope_tokens, scope_cost)) => {
                    tokens_used += scope_tokens;
                    cost += scope_cost;
                    let adopted = adopt_category(&consolidated, category);
                    match adopted {
                        Some(adopted_group) => result.insert(category.clone(), adopted_group),
                        None => {
                            tracing::warn!(category = %category, "Consolidated output missing category, keeping input");
                            result.insert(category.clone(), group.clone());
                        }
                    }
                }
                None => result.insert(category.clone(), group.clone()),
            }
        }

        ConsolidationOutput {
            insights: result,
            tokens_used,
            cost,
        }
    }

    /// Run one consolidation call for a scope (global or single category).
    /// Returns `None` on any failure; the caller falls back to the input.
    fn consolidate_scope(
        &self,
        scope: &CategoryInsights,
    ) -> Option<(CategoryInsights, u32, f64)> {
        let payload = match serde_json::to_string(scope) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize consolidation payload");
                return None;
            }
        };

        let prompt_text = prompt::build_consolidation_prompt(&payload, self.settings);
        let request = CompletionRequest {
            model: &self.settings.consolidation_model,
            system: prompt::CONSOLIDATION_SYSTEM,
            prompt: &prompt_text,
            temperature: self.settings.temperature,
            json_output: true,
        };

        let response = match self.client.complete(&request) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Consolidation call failed, falling back to merged input");
                return None;
            }
        };

        let parsed = match parser::parse_category_insights(&response.text) {
            Some(parsed) if !parsed.is_empty() => parsed,
            _ => {
                tracing::warn!("Consolidation output undecodable, falling back to merged input");
                return None;
            }
        };

        // Re-tighten the no-similar-insights invariant on the model's output
        let mut deduped = CategoryInsights::new();
        merge::merge_into(&mut deduped, &parsed, &self.settings.similarity);

        let cost = self
            .settings
            .consolidation_rates
            .cost(response.prompt_tokens, response.completion_tokens);
        Some((deduped, response.total_tokens(), cost))
    }
}

/// Pick the consolidated group for `category` out of a per-category response.
/// The model occasionally renames the key; a single-category response is
/// adopted under the requested name.
fn adopt_category(
    consolidated: &CategoryInsights,
    category: &str,
) -> Option<crate::types::InsightGroup> {
    if let Some(group) = consolidated.get(category) {
        return Some(group.clone());
    }
    let mut iter = consolidated.iter();
    match (iter.next(), iter.next()) {
        (Some((_, only_group)), None) => Some(only_group.clone()),
        _ => None,
    }
}
