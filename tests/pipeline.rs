//! Integration tests for the full generation pipeline.
//!
//! These tests drive `generate` end to end with a scripted in-process
//! [`ChatProvider`] stub, so they need no network access, no API key, and
//! no environment setup. Run with:
//!   cargo test --test pipeline

use async_trait::async_trait;
use flashgen::{
    generate, generate_to_csv, ChatProvider, FlashgenError, GenerationConfig, ProviderError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// A chat backend that replays a fixed script of responses, one per call.
/// `Err` entries simulate a transport failure on that call.
struct ScriptedProvider {
    calls: AtomicUsize,
    script: Vec<Result<String, String>>,
}

impl ScriptedProvider {
    fn new(script: Vec<Result<String, String>>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            script,
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn chat(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.get(n) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(msg)) => Err(ProviderError::Transport(msg.clone())),
            None => panic!("stub provider called more times than scripted ({n})"),
        }
    }
}

/// A well-formed `{"cards": [...]}` response with `n` labelled cards.
fn cards_json(label: usize, n: usize) -> String {
    let cards: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "question": format!("Q{label}-{i}"),
                "answer": format!("A{label}-{i}"),
                "tags": "alpha, beta",
                "type": "Standard"
            })
        })
        .collect();
    serde_json::json!({ "cards": cards }).to_string()
}

/// 5000 characters of 9-char word units; splits into exactly 3 chunks at
/// the default chunk size of 2000 with 200 overlap.
fn long_text() -> String {
    let mut text = "abcdefgh ".repeat(556);
    text.truncate(5000);
    text
}

fn config_with(provider: Arc<dyn ChatProvider>, total_cards: usize) -> GenerationConfig {
    GenerationConfig::builder()
        .provider(provider)
        .total_cards(total_cards)
        .concurrency(1)
        .build()
        .expect("valid config")
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn ten_cards_across_three_chunks_in_source_order() {
    // The model over-generates 8 cards per chunk; quotas of [4, 3, 3]
    // must truncate each chunk's contribution.
    let provider = ScriptedProvider::new(vec![
        Ok(cards_json(1, 8)),
        Ok(cards_json(2, 8)),
        Ok(cards_json(3, 8)),
    ]);
    let config = config_with(provider.clone(), 10);

    let out = generate(&long_text(), &config).await.expect("run succeeds");

    assert_eq!(provider.call_count(), 3, "one LLM call per chunk");
    assert_eq!(out.stats.total_chunks, 3);
    assert_eq!(out.cards.len(), 10);

    // Front-loaded quota split.
    let produced: Vec<usize> = out.chunks.iter().map(|c| c.produced).collect();
    assert_eq!(produced, vec![4, 3, 3]);

    // Cards appear in source-chunk order.
    let questions: Vec<&str> = out.cards.iter().map(|c| c.question.as_str()).collect();
    assert_eq!(
        questions,
        vec![
            "Q1-0", "Q1-1", "Q1-2", "Q1-3", "Q2-0", "Q2-1", "Q2-2", "Q3-0", "Q3-1", "Q3-2",
        ]
    );

    // Comma-separated tag strings come back as lists.
    assert_eq!(out.cards[0].tags, vec!["alpha", "beta"]);
    assert_eq!(out.cards[0].card_type, "Standard");
}

#[tokio::test]
async fn fenced_and_chatty_responses_still_parse() {
    let fenced = format!(
        "Here are your flashcards!\n```json\n{}\n```\nLet me know if you need more.",
        cards_json(1, 3)
    );
    let provider = ScriptedProvider::new(vec![Ok(fenced)]);
    let config = config_with(provider, 3);

    let out = generate("A short paragraph of study material.", &config)
        .await
        .expect("run succeeds");

    assert_eq!(out.cards.len(), 3);
    assert_eq!(out.stats.failed_chunks, 0);
}

// ── Failure containment ──────────────────────────────────────────────────────

#[tokio::test]
async fn missing_credential_aborts_before_any_call() {
    let config = GenerationConfig::builder()
        .total_cards(10)
        .build()
        .expect("valid config");

    let err = generate(&long_text(), &config).await.unwrap_err();
    assert!(matches!(err, FlashgenError::MissingApiKey));
}

#[tokio::test]
async fn one_failed_chunk_does_not_sink_the_run() {
    let provider = ScriptedProvider::new(vec![
        Ok(cards_json(1, 8)),
        Err("connection reset by peer".into()),
        Ok(cards_json(3, 8)),
    ]);
    let config = config_with(provider, 10);

    let out = generate(&long_text(), &config).await.expect("run succeeds");

    assert_eq!(out.stats.failed_chunks, 1);
    assert_eq!(out.stats.processed_chunks, 2);
    // The failed middle chunk contributed nothing; others kept their quota.
    assert_eq!(out.cards.len(), 7);
    assert_eq!(out.chunks[1].produced, 0);
    assert!(out.chunks[1].error.is_some());
    assert!(out.chunks[0].error.is_none());

    // Order is preserved across the gap.
    assert!(out.cards[0].question.starts_with("Q1-"));
    assert!(out.cards[4].question.starts_with("Q3-"));
}

#[tokio::test]
async fn unparseable_response_yields_zero_cards_without_error() {
    // Garbage output parses to an empty deck; the chunk is processed, not
    // failed, and nothing synthetic fills the gap.
    let provider = ScriptedProvider::new(vec![Ok("I cannot help with that.".into())]);
    let config = config_with(provider, 5);

    let out = generate("Some study material.", &config)
        .await
        .expect("run succeeds");

    assert!(out.cards.is_empty());
    assert_eq!(out.stats.failed_chunks, 0);
    assert_eq!(out.chunks[0].requested, 5);
    assert_eq!(out.chunks[0].produced, 0);
}

#[tokio::test]
async fn invalid_records_are_dropped_not_replaced() {
    let response = serde_json::json!({
        "cards": [
            {"question": "  ", "answer": "blank question"},
            {"question": "Valid?", "answer": "Yes."},
            {"question": "No answer", "answer": ""},
        ]
    })
    .to_string();
    let provider = ScriptedProvider::new(vec![Ok(response)]);
    let config = config_with(provider, 5);

    let out = generate("Some study material.", &config)
        .await
        .expect("run succeeds");

    assert_eq!(out.cards.len(), 1);
    assert_eq!(out.cards[0].question, "Valid?");
    assert_eq!(out.chunks[0].produced, 1);
}

// ── Export ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn simulate_to_csv_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("deck.csv");

    let config = GenerationConfig::builder()
        .simulate(true)
        .total_cards(3)
        .build()
        .expect("valid config");

    let stats = generate_to_csv(
        "First fact. Second fact. Third fact. Fourth fact.",
        &path,
        &config,
    )
    .await
    .expect("run succeeds");

    assert_eq!(stats.produced_cards, 3);

    let csv = std::fs::read_to_string(&path).expect("csv written");
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Question,Answer,Tags,Type"));
    assert_eq!(lines.count(), 3);
}

#[tokio::test]
async fn quoting_survives_csv_round_trip() {
    let response = serde_json::json!({
        "cards": [{
            "question": "What does \"CSV\" stand for, roughly?",
            "answer": "Comma-separated values,\nwith embedded newlines here",
            "tags": ["formats"],
            "type": "Standard"
        }]
    })
    .to_string();
    let provider = ScriptedProvider::new(vec![Ok(response)]);
    let config = config_with(provider, 1);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("deck.csv");
    generate_to_csv("Some study material.", &path, &config)
        .await
        .expect("run succeeds");

    let csv = std::fs::read_to_string(&path).expect("csv written");
    assert!(csv.contains(r#""What does ""CSV"" stand for, roughly?""#));
    assert!(csv.contains("embedded newlines"));
}
