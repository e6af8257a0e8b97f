//! Progressive merging of per-batch insight structures.
//!
//! The similarity predicate is a deliberately crude token-overlap heuristic.
//! It errs toward false negatives: near-duplicates it misses stay separate
//! and are left for the consolidation pass, which has semantic judgment the
//! heuristic lacks. What it does catch accumulates quotes instead of
//! proliferating entries.

use std::collections::HashSet;

use crate::config::SimilaritySettings;
use crate::types::{CategoryInsights, Insight};

/// Lowercased whitespace tokens of a pattern label.
fn pattern_tokens(pattern: &str) -> Vec<String> {
    pattern
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Two insights are similar when both have non-empty patterns and the count
/// of shared tokens longer than `min_token_len` reaches `overlap_ratio` of
/// the smaller pattern's token count. Symmetric by construction.
pub fn similar(a: &Insight, b: &Insight, settings: &SimilaritySettings) -> bool {
    if a.pattern.trim().is_empty() || b.pattern.trim().is_empty() {
        return false;
    }

    let tokens_a = pattern_tokens(&a.pattern);
    let tokens_b = pattern_tokens(&b.pattern);
    let smaller = tokens_a.len().min(tokens_b.len());
    if smaller == 0 {
        return false;
    }

    let set_b: HashSet<&str> = tokens_b.iter().map(String::as_str).collect();
    let shared: HashSet<&str> = tokens_a
        .iter()
        .map(String::as_str)
        .filter(|t| t.chars().count() > settings.min_token_len && set_b.contains(*t))
        .collect();

    shared.len() as f32 >= settings.overlap_ratio * smaller as f32
}

/// Fold `incoming` into `accumulated`. Additive only: quotes are unioned
/// (case-sensitive exact match, first-seen order kept), context is replaced
/// only by a strictly longer one, patterns are never altered here. Insights
/// with no similar counterpart are appended as deep copies.
///
/// Usable as a left-fold over batch results; merge order may change quote
/// accumulation order but never the final set of distinct insights.
pub fn merge_into(
    accumulated: &mut CategoryInsights,
    incoming: &CategoryInsights,
    settings: &SimilaritySettings,
) {
    for (category, group) in incoming.iter() {
        let target = accumulated.entry(category);
        for insight in &group.insights {
            match target
                .insights
                .iter_mut()
                .find(|existing| similar(existing, insight, settings))
            {
                Some(existing) => {
                    for quote in &insight.quotes {
                        if !existing.quotes.contains(quote) {
                            existing.quotes.push(quote.clone());
                        }
                    }
                    if insight.context.chars().count() > existing.context.chars().count() {
                        existing.context = insight.context.clone();
                    }
                }
                None => target.insights.push(insight.clone()),
            }
        }
    }
}
