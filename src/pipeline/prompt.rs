//! Prompt assembly for the extraction and consolidation calls.
//!
//! Templates are plain strings with `{{reviews}}` / `{{categories}}`
//! placeholders so callers can supply their own wording without touching
//! the pipeline. The consolidation instructions are fixed: they encode the
//! dedup/translation contract the consolidator depends on.

use crate::config::PipelineSettings;
use crate::types::Review;

/// Placeholder substituted with the formatted batch listing.
pub const REVIEWS_PLACEHOLDER: &str = "{{reviews}}";

/// Placeholder substituted with the configured category labels.
pub const CATEGORIES_PLACEHOLDER: &str = "{{categories}}";

pub const EXTRACTION_SYSTEM: &str =
    "You are a customer feedback analyst. Respond with a single valid JSON object and nothing else.";

pub const CONSOLIDATION_SYSTEM: &str =
    "You are consolidating extracted customer insights. Respond with a single valid JSON object and nothing else.";

/// Default extraction template. Output shape per category:
/// `{"<category>": {"insights": [{"quotes": [...], "context": "...", "pattern": "..."}]}}`.
pub const DEFAULT_EXTRACTION_TEMPLATE: &str = r#"Analyze the customer reviews below and extract recurring findings into these categories: {{categories}}.

For each finding return an object with:
- "quotes": verbatim excerpts from the reviews that support it
- "context": a short explanation of what customers are experiencing
- "pattern": a 5-10 word label naming the finding

Return a JSON object mapping each category name to {"insights": [...]}. Only include categories with at least one finding.

Reviews:
{{reviews}}"#;

/// Format one batch of reviews as a numbered listing for prompt inclusion.
/// Rating is shown only when present (non-zero); title only when set.
pub fn format_reviews(batch: &[Review]) -> String {
    batch
        .iter()
        .enumerate()
        .map(|(i, review)| {
            let mut line = format!("[Review {}]", i + 1);
            if review.rating > 0.0 {
                line.push_str(&format!(" ({}/5)", review.rating));
            }
            if let Some(title) = &review.title {
                line.push_str(&format!(" \"{title}\""));
            }
            line.push_str(&format!(": {}", review.content));
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Substitute the batch listing and category labels into an extraction template.
pub fn build_extraction_prompt(template: &str, batch: &[Review], categories: &[String]) -> String {
    template
        .replace(CATEGORIES_PLACEHOLDER, &categories.join(", "))
        .replace(REVIEWS_PLACEHOLDER, &format_reviews(batch))
}

/// Build the consolidation prompt around a JSON payload of merged insights.
///
/// The instruction block encodes the consolidation contract: merge only true
/// duplicates, keep distinct findings apart, short patterns, translate
/// non-English quotes with an origin marker, and a target density band.
pub fn build_consolidation_prompt(payload_json: &str, settings: &PipelineSettings) -> String {
    format!(
        r#"Consolidate the extracted customer insights below.

Rules:
1. Merge ONLY true duplicates: insights describing the same exact issue or benefit. Combine their quotes and keep the clearest context.
2. Do NOT merge insights that are merely related. Distinct findings within the same topical area stay separate.
3. Every "pattern" must be a 5-10 word label, never a full sentence.
4. Translate any non-English quote to English and append " [Originally in <Language>]" to the translated text.
5. Where volume allows, aim for {min} to {max} distinct insights per category.

Keep the same JSON shape: each category maps to {{"insights": [...]}} with "quotes", "context" and "pattern" fields. Do not drop categories or invent findings.

Insights:
{payload_json}"#,
        min = settings.consolidation_target_min,
        max = settings.consolidation_target_max,
    )
}
