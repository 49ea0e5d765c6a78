//! Normalisation of raw LLM card records into the canonical schema.
//!
//! The LLM's output carries no schema guarantee: `tags` may be a string, a
//! list, or missing; `type` may be absent; fields may have the wrong JSON
//! type entirely. Everything here is lenient — odd shapes are coerced,
//! missing fields get defaults, and only one rule is fatal to a record:
//! an empty question or answer drops it silently.

use crate::output::Flashcard;
use serde_json::Value;

/// One unvalidated card as produced by the generator stage.
///
/// `question`/`answer` are already stringified and trimmed by the generator;
/// `tags` and `card_type` pass through as raw JSON until normalisation.
#[derive(Debug, Clone, Default)]
pub struct RawCard {
    pub question: String,
    pub answer: String,
    pub tags: Option<Value>,
    pub card_type: Option<Value>,
}

impl RawCard {
    /// Build a raw card from one element of the parsed `cards` array.
    /// Never fails: absent or oddly-typed fields become empty strings, and
    /// validity is decided later by [`normalize`].
    pub fn from_value(value: &Value) -> Self {
        Self {
            question: lenient_str(value.get("question")),
            answer: lenient_str(value.get("answer")),
            tags: value.get("tags").cloned(),
            card_type: value.get("type").cloned(),
        }
    }
}

/// Convert a raw record into a canonical [`Flashcard`].
///
/// Returns `None` when the question or answer is empty after trimming —
/// such records are dropped, not errors. Tag strings are comma-split and
/// trimmed; tag lists pass through element-wise; a missing or empty type
/// defaults to `"Standard"`.
pub fn normalize(raw: RawCard) -> Option<Flashcard> {
    let question = raw.question.trim().to_string();
    let answer = raw.answer.trim().to_string();
    if question.is_empty() || answer.is_empty() {
        return None;
    }

    let tags = normalize_tags(raw.tags.as_ref());

    let card_type = raw
        .card_type
        .as_ref()
        .map(|v| lenient_str(Some(v)))
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "Standard".to_string());

    Some(Flashcard {
        question,
        answer,
        tags,
        card_type,
    })
}

/// Canonicalise the `tags` field: comma-split a single string, stringify a
/// list element-wise, and treat anything else as no tags.
fn normalize_tags(tags: Option<&Value>) -> Vec<String> {
    match tags {
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| lenient_str(Some(v)))
            .filter(|t| !t.trim().is_empty())
            .map(|t| t.trim().to_string())
            .collect(),
        _ => Vec::new(),
    }
}

/// Stringify a JSON value the way a duck-typed caller would: strings as-is,
/// numbers and booleans via display, everything else empty.
pub fn lenient_str(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
