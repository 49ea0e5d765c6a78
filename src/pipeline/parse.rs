//! Tolerant JSON extraction from raw LLM output.
//!
//! Chat models frequently wrap their JSON payload in markdown fences or
//! prose ("Here are your flashcards: …") despite explicit instructions not
//! to. Rather than failing the chunk, we parse leniently: try the whole
//! text, then the substring between the first `{` and the last `}`. A chunk
//! whose response defeats both attempts simply yields zero cards — one bad
//! response never aborts the whole run.

use serde_json::{json, Value};
use tracing::debug;

/// Extract a JSON object with a `cards` array from raw LLM output.
///
/// Always returns an object carrying a `cards` array; on unrecoverable
/// input that array is empty. Never panics, never errors.
pub fn extract_json(raw: &str) -> Value {
    if let Some(value) = parse_object_with_cards(raw) {
        return value;
    }

    // Fall back to the outermost brace-delimited substring. This strips
    // markdown fences, leading prose, and trailing explanations in one go.
    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if end > start {
            if let Some(value) = parse_object_with_cards(&raw[start..=end]) {
                return value;
            }
        }
    }

    debug!("no parseable cards object in LLM response ({} bytes)", raw.len());
    json!({ "cards": [] })
}

/// Parse `text` as JSON and ensure the result is an object with a `cards`
/// array, normalising shapes that are close but not exact.
fn parse_object_with_cards(text: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    match value {
        Value::Object(ref map) => {
            if map.get("cards").map(Value::is_array).unwrap_or(false) {
                Some(value)
            } else {
                // An object without a cards array carries no cards.
                Some(json!({ "cards": [] }))
            }
        }
        // A bare top-level array is treated as the cards array itself.
        Value::Array(items) => Some(json!({ "cards": items })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_clean_json() {
        let v = extract_json(r#"{"cards":[{"question":"Q","answer":"A"}]}"#);
        assert_eq!(v["cards"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn strips_markdown_fences() {
        let raw = "```json\n{\"cards\":[{\"question\":\"Q\",\"answer\":\"A\"}]}\n```";
        let v = extract_json(raw);
        assert_eq!(v, json!({"cards":[{"question":"Q","answer":"A"}]}));
    }

    #[test]
    fn tolerates_surrounding_prose() {
        let raw = "Here are your flashcards!\n{\"cards\": []}\nLet me know if you need more.";
        let v = extract_json(raw);
        assert!(v["cards"].as_array().unwrap().is_empty());
    }

    #[test]
    fn garbage_yields_empty_cards() {
        let v = extract_json("not json at all");
        assert_eq!(v, json!({"cards": []}));
    }

    #[test]
    fn empty_input_yields_empty_cards() {
        assert_eq!(extract_json(""), json!({"cards": []}));
    }

    #[test]
    fn object_without_cards_yields_empty_cards() {
        let v = extract_json(r#"{"flashcards": [{"question":"Q"}]}"#);
        assert_eq!(v, json!({"cards": []}));
    }

    #[test]
    fn bare_array_is_promoted_to_cards() {
        let v = extract_json(r#"[{"question":"Q","answer":"A"}]"#);
        assert_eq!(v["cards"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn nested_braces_in_prose_still_recovered() {
        let raw = "The answer {spoiler} is below:\n{\"cards\": [{\"question\":\"Q\",\"answer\":\"A\"}]}";
        // First "{" starts at the prose brace; the first-to-last substring is
        // not valid JSON, so this degrades to zero cards rather than panicking.
        let v = extract_json(raw);
        assert!(v["cards"].is_array());
    }
}
