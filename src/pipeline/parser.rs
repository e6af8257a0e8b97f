//! Defensive decoding of completion output into `CategoryInsights`.
//!
//! JSON output mode is a soft contract: responses arrive as bare JSON, JSON
//! wrapped in markdown fences, or occasionally with an extra `insights`
//! nesting layer per category. Decoding tries the primary shape, falls back
//! to one level of unwrapping, and otherwise treats the scope as empty so
//! ambiguous shapes never travel deeper into the pipeline.

use serde_json::Value;

use crate::types::{CategoryInsights, Insight, InsightGroup};

/// Parse completion output into the category → insights structure.
/// Returns `None` when no JSON object can be recovered from the text.
pub fn parse_category_insights(text: &str) -> Option<CategoryInsights> {
    let json_str = extract_json_object(text)?;
    let value: Value = serde_json::from_str(json_str).ok()?;
    let map = value.as_object()?;

    let mut result = CategoryInsights::new();
    for (category, group_value) in map {
        let insights = decode_group(group_value);
        if !insights.is_empty() {
            result.insert(category.clone(), InsightGroup { insights });
        }
    }
    Some(result)
}

/// Locate the outermost JSON object in the response text. Tolerates markdown
/// fences and prose before/after the object. A top-level array is rejected:
/// the insight objects inside it would otherwise be mistaken for the
/// category map itself.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    if let Some(bracket) = text.find('[') {
        if bracket < start {
            return None;
        }
    }
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Decode one category's value. Accepted shapes, in order:
/// `{"insights": [...]}`, `{"insights": {"insights": [...]}}` (one defensive
/// unwrap), or a bare insight array. Anything else decodes as empty.
fn decode_group(value: &Value) -> Vec<Insight> {
    if let Some(arr) = value.as_array() {
        return decode_insight_array(arr);
    }

    let Some(inner) = value.get("insights") else {
        return Vec::new();
    };

    if let Some(arr) = inner.as_array() {
        return decode_insight_array(arr);
    }

    // One extra nesting layer: {"insights": {"insights": [...]}}
    if let Some(arr) = inner.get("insights").and_then(Value::as_array) {
        return decode_insight_array(arr);
    }

    Vec::new()
}

/// Decode insights leniently; items that fail to decode are skipped.
fn decode_insight_array(items: &[Value]) -> Vec<Insight> {
    items.iter().filter_map(decode_insight).collect()
}

fn decode_insight(value: &Value) -> Option<Insight> {
    let obj = value.as_object()?;

    let quotes = match obj.get("quotes") {
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(|q| q.as_str().map(str::to_string))
            .collect(),
        // Tolerate a single quote string instead of an array
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    };

    let context = obj
        .get("context")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let pattern = obj
        .get("pattern")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    // An insight with neither quotes nor a pattern carries no information
    if quotes.is_empty() && pattern.is_empty() {
        return None;
    }

    Some(Insight {
        quotes,
        context,
        pattern,
    })
}
