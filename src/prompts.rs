//! Prompt construction for flashcard generation.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the default behaviour (e.g.
//!    tightening the output-shape instructions) requires editing exactly one
//!    place.
//!
//! 2. **Testability** — unit tests can inspect the prompts directly without
//!    spinning up a real model, making prompt regressions easy to catch.

/// Worked JSON example embedded in every user instruction.
///
/// One concrete example anchors the model's output format far more reliably
/// than shape prose alone.
pub const EXAMPLE_JSON: &str = r#"{"cards": [{"question": "What process do plants use to convert light into chemical energy?", "answer": "Photosynthesis", "tags": ["Biology"], "type": "Standard"}]}"#;

/// Build the system instruction for one generation run.
///
/// Describes the role, the required output shape (a JSON object with a
/// `cards` array of question/answer/tags/type objects), the requested
/// difficulty, card type, and output language, and qualitative guidance on
/// what makes a card worth keeping.
pub fn system_prompt(difficulty: &str, card_type: &str, language: &str) -> String {
    format!(
        r#"You are an expert educational flashcard creator. From the provided study material, produce high-quality question/answer flashcards.

Output requirements:
- Respond with a single JSON object, no surrounding prose or markdown fences.
- The object has one key, "cards", whose value is an array.
- Each array element is an object with keys "question", "answer", "tags" (array of topic strings), and "type".
- Difficulty level: {difficulty}
- Card type: {card_type}
- Write all questions and answers in {language}.

Content guidance:
- Avoid trivial or self-answering questions.
- Favour key concepts, causal relations, definitions, dates, and figures.
- Questions must be concise and unambiguous; answers accurate and compact."#
    )
}

/// Build the user instruction for one chunk: the source text, the requested
/// card count, and the worked example.
pub fn user_prompt(chunk: &str, count: usize) -> String {
    format!(
        "Study material:\n{chunk}\n\nGenerate exactly {count} flashcards. JSON format example: {EXAMPLE_JSON}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_embeds_parameters() {
        let p = system_prompt("Advanced", "True-False", "German");
        assert!(p.contains("Difficulty level: Advanced"));
        assert!(p.contains("Card type: True-False"));
        assert!(p.contains("in German"));
        assert!(p.contains("\"cards\""));
    }

    #[test]
    fn user_prompt_embeds_chunk_and_count() {
        let p = user_prompt("The mitochondria is the powerhouse of the cell.", 4);
        assert!(p.contains("mitochondria"));
        assert!(p.contains("exactly 4 flashcards"));
        assert!(p.contains(EXAMPLE_JSON));
    }

    #[test]
    fn example_json_is_valid_and_shaped() {
        let v: serde_json::Value = serde_json::from_str(EXAMPLE_JSON).unwrap();
        let cards = v["cards"].as_array().unwrap();
        assert_eq!(cards.len(), 1);
        assert!(cards[0]["question"].is_string());
        assert!(cards[0]["answer"].is_string());
        assert!(cards[0]["tags"].is_array());
        assert!(cards[0]["type"].is_string());
    }
}
