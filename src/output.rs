//! Output types: the canonical flashcard and the per-run result bundle.

use crate::error::ChunkError;
use serde::{Deserialize, Serialize};

/// A canonical question/answer study unit.
///
/// Invariant: `question` and `answer` are non-empty after normalisation —
/// records that fail this are dropped before they ever reach a
/// `Flashcard`. `tags` may be empty; `card_type` defaults to `"Standard"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "type", default = "default_card_type")]
    pub card_type: String,
}

fn default_card_type() -> String {
    "Standard".to_string()
}

/// Per-chunk outcome, kept for inspection alongside the flat card list.
///
/// A failed chunk has `error = Some(..)` and contributed zero cards; the
/// run as a whole still succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkOutcome {
    /// 1-indexed chunk number, in source order.
    pub chunk_num: usize,
    /// Cards this chunk was asked to produce (its quota).
    pub requested: usize,
    /// Valid cards this chunk actually contributed.
    pub produced: usize,
    /// Wall-clock time spent on this chunk's LLM call(s).
    pub duration_ms: u64,
    /// Retries consumed before success (or exhaustion).
    pub retries: u32,
    /// Set when the chunk's LLM call failed after all retries.
    pub error: Option<ChunkError>,
}

/// Aggregate statistics for one generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Chunks the source text was split into.
    pub total_chunks: usize,
    /// Chunks whose LLM call succeeded (or that were skipped with quota 0).
    pub processed_chunks: usize,
    /// Chunks whose LLM call failed after all retries.
    pub failed_chunks: usize,
    /// Cards requested by the caller.
    pub requested_cards: usize,
    /// Cards in the final output (≤ requested).
    pub produced_cards: usize,
    /// Total wall-clock time for the run.
    pub total_duration_ms: u64,
    /// Time spent inside LLM calls (sum when sequential).
    pub llm_duration_ms: u64,
}

/// Everything a generation run produces.
///
/// Serialises with `cards` first so the JSON shape matches the outbound
/// `{"cards": [...]}` contract consumed by API layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutput {
    /// The flashcards, ordered by source chunk.
    pub cards: Vec<Flashcard>,
    /// Per-chunk outcomes, in source order.
    pub chunks: Vec<ChunkOutcome>,
    /// Run statistics.
    pub stats: GenerationStats,
}

impl GenerationOutput {
    /// An output for a run that found no chunks (empty input).
    pub(crate) fn empty(requested_cards: usize) -> Self {
        Self {
            cards: Vec::new(),
            chunks: Vec::new(),
            stats: GenerationStats {
                requested_cards,
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flashcard_serialises_type_field_name() {
        let card = Flashcard {
            question: "Q".into(),
            answer: "A".into(),
            tags: vec!["Biology".into()],
            card_type: "Standard".into(),
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["type"], "Standard");
        assert!(json.get("card_type").is_none());
    }

    #[test]
    fn flashcard_deserialises_with_defaults() {
        let card: Flashcard =
            serde_json::from_str(r#"{"question":"Q","answer":"A"}"#).unwrap();
        assert!(card.tags.is_empty());
        assert_eq!(card.card_type, "Standard");
    }

    #[test]
    fn output_json_has_cards_key() {
        let out = GenerationOutput::empty(10);
        let json = serde_json::to_value(&out).unwrap();
        assert!(json["cards"].as_array().unwrap().is_empty());
        assert_eq!(json["stats"]["requested_cards"], 10);
    }
}
