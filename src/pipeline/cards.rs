//! Per-chunk card generation: build the prompts, call the provider, parse
//! and truncate the response.
//!
//! This module is intentionally thin — all prompt engineering lives in
//! [`crate::prompts`] so it can be changed without touching the retry or
//! error-handling logic here.
//!
//! ## Failure containment
//!
//! [`process_chunk`] always returns a [`ChunkYield`] — it never propagates
//! an error upward, so a single bad chunk cannot abort the run. Transport
//! failures are recorded in `yield.error`; unparseable responses are not
//! errors at all and simply produce zero cards.

use crate::config::GenerationConfig;
use crate::error::ChunkError;
use crate::pipeline::normalize::RawCard;
use crate::pipeline::parse;
use crate::prompts;
use crate::provider::ChatProvider;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// What one chunk contributed: raw records plus call metadata.
#[derive(Debug, Default)]
pub struct ChunkYield {
    /// 1-indexed chunk number.
    pub chunk_num: usize,
    /// Raw records, already truncated to the quota and stripped of
    /// empty-question/answer entries.
    pub cards: Vec<RawCard>,
    /// Wall-clock time spent in LLM calls for this chunk.
    pub duration_ms: u64,
    /// Retries consumed.
    pub retries: u32,
    /// Set when every attempt failed at the transport level.
    pub error: Option<ChunkError>,
}

/// Generate up to `quota` raw card records from one chunk via the LLM.
///
/// Builds the system and user instructions, performs the (optionally
/// retried) chat call, runs the tolerant JSON parser over the response,
/// truncates to the quota, and drops records whose question or answer is
/// empty after trimming. Extra records beyond the quota are discarded —
/// models routinely over-generate.
pub async fn process_chunk(
    provider: &Arc<dyn ChatProvider>,
    chunk_num: usize,
    chunk: &str,
    quota: usize,
    config: &GenerationConfig,
) -> ChunkYield {
    let start = Instant::now();
    let system = prompts::system_prompt(&config.difficulty, &config.card_type, &config.language);
    let user = prompts::user_prompt(chunk, quota);

    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "Chunk {}: retry {}/{} after {}ms",
                chunk_num, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match provider.chat(&system, &user).await {
            Ok(response) => {
                let cards = cards_from_response(&response, quota);
                debug!(
                    "Chunk {}: {} cards from {} response bytes in {:?}",
                    chunk_num,
                    cards.len(),
                    response.len(),
                    start.elapsed()
                );
                return ChunkYield {
                    chunk_num,
                    cards,
                    duration_ms: start.elapsed().as_millis() as u64,
                    retries: attempt,
                    error: None,
                };
            }
            Err(e) => {
                let msg = e.to_string();
                warn!("Chunk {}: attempt {} failed — {}", chunk_num, attempt + 1, msg);
                last_err = Some(msg);
            }
        }
    }

    // All attempts exhausted: zero cards, error recorded, run continues.
    ChunkYield {
        chunk_num,
        cards: Vec::new(),
        duration_ms: start.elapsed().as_millis() as u64,
        retries: config.max_retries,
        error: Some(ChunkError::LlmFailed {
            chunk: chunk_num,
            retries: config.max_retries,
            detail: last_err.unwrap_or_else(|| "unknown error".to_string()),
        }),
    }
}

/// Parse a raw LLM response into at most `quota` raw card records.
///
/// Truncation happens *before* validation: an invalid record inside the
/// first `quota` entries is dropped, not replaced by a later one.
fn cards_from_response(response: &str, quota: usize) -> Vec<RawCard> {
    let parsed = parse::extract_json(response);
    let entries = parsed["cards"].as_array().cloned().unwrap_or_default();

    entries
        .iter()
        .take(quota)
        .map(RawCard::from_value)
        .map(|mut raw| {
            raw.question = raw.question.trim().to_string();
            raw.answer = raw.answer.trim().to_string();
            raw
        })
        .filter(|raw| !raw.question.is_empty() && !raw.answer.is_empty())
        .collect()
}

/// Offline stand-in for the LLM: one card per leading sentence of the
/// chunk, capped at the quota. Used by simulation mode so the pipeline can
/// be exercised end-to-end without a credential.
pub fn simulate_chunk(chunk_num: usize, chunk: &str, quota: usize) -> ChunkYield {
    let flattened = chunk.replace('\n', " ");
    let cards: Vec<RawCard> = flattened
        .split(['。', '.'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(quota)
        .enumerate()
        .map(|(i, sentence)| RawCard {
            question: format!("What is the key point of this passage? ({})", i + 1),
            answer: sentence.to_string(),
            tags: None,
            card_type: None,
        })
        .collect();

    ChunkYield {
        chunk_num,
        cards,
        duration_ms: 0,
        retries: 0,
        error: None,
    }
}
