//! Generation entry points: the pipeline driver.
//!
//! ## Orchestration
//!
//! One run is a straight line: chunk the text, allocate per-chunk quotas,
//! drive the LLM for each chunk with a quota, normalise, concatenate.
//! Chunks are independent — no shared mutable state — so the driver can fan
//! their LLM calls out concurrently, but results are always re-sorted into
//! source-chunk order before assembly and the default `concurrency` of 1
//! keeps the reference sequential behaviour.
//!
//! Failure is contained per chunk: a chunk whose LLM call fails contributes
//! zero cards and a recorded [`crate::error::ChunkError`]; only a missing
//! credential aborts the run, and it does so before any chunk is sent.

use crate::config::GenerationConfig;
use crate::error::FlashgenError;
use crate::export;
use crate::output::{ChunkOutcome, Flashcard, GenerationOutput, GenerationStats};
use crate::pipeline::{allocate, cards, chunk, input, normalize};
use crate::provider::{ChatProvider, OpenAiCompatProvider};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// One chunk's contribution after generation and normalisation.
struct ProcessedChunk {
    outcome: ChunkOutcome,
    cards: Vec<Flashcard>,
}

/// Generate flashcards from source text.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(GenerationOutput)` on success, even if some chunks failed (check
/// `output.stats.failed_chunks`). Empty input yields a successful output
/// with zero cards.
///
/// # Errors
/// Returns `Err(FlashgenError)` only for fatal conditions — chiefly
/// [`FlashgenError::MissingApiKey`] when no provider, no API key, and no
/// simulation mode is configured.
pub async fn generate(
    text: &str,
    config: &GenerationConfig,
) -> Result<GenerationOutput, FlashgenError> {
    let total_start = Instant::now();

    // ── Step 1: Chunk ────────────────────────────────────────────────────
    let chunks = chunk::chunk_text(text, config.chunk_size, config.chunk_overlap);
    if chunks.is_empty() {
        info!("input produced no chunks; returning empty output");
        return Ok(GenerationOutput::empty(config.total_cards));
    }
    info!("split input into {} chunks", chunks.len());

    // ── Step 2: Allocate quotas ──────────────────────────────────────────
    let quotas = allocate::allocate(config.total_cards, chunks.len());
    debug!(?quotas, "per-chunk card quotas");

    // ── Step 3: Resolve the backend (credential check happens here, once,
    //    before any chunk is processed) ───────────────────────────────────
    let provider = if config.simulate {
        None
    } else {
        Some(resolve_provider(config)?)
    };

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_start(chunks.len());
    }

    // ── Step 4: Process chunks ───────────────────────────────────────────
    let llm_start = Instant::now();
    let mut processed = process_chunks(&chunks, &quotas, provider.as_ref(), config).await;
    processed.sort_by_key(|p| p.outcome.chunk_num);
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

    // ── Step 5: Assemble output in source order ──────────────────────────
    let mut all_cards = Vec::with_capacity(config.total_cards);
    let mut outcomes = Vec::with_capacity(chunks.len());
    for p in processed {
        outcomes.push(p.outcome);
        all_cards.extend(p.cards);
    }

    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
    let stats = GenerationStats {
        total_chunks: chunks.len(),
        processed_chunks: chunks.len() - failed,
        failed_chunks: failed,
        requested_cards: config.total_cards,
        produced_cards: all_cards.len(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        llm_duration_ms,
    };

    info!(
        "generation complete: {}/{} cards from {} chunks in {}ms",
        stats.produced_cards, stats.requested_cards, stats.total_chunks, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_complete(chunks.len(), all_cards.len());
    }

    Ok(GenerationOutput {
        cards: all_cards,
        chunks: outcomes,
        stats,
    })
}

/// Generate flashcards from a local text or PDF file.
pub async fn generate_from_file(
    path: impl AsRef<Path>,
    config: &GenerationConfig,
) -> Result<GenerationOutput, FlashgenError> {
    let text = input::load_input(path).await?;
    generate(&text, config).await
}

/// Generate flashcards and write them directly to a CSV file.
pub async fn generate_to_csv(
    text: &str,
    output_path: impl AsRef<Path>,
    config: &GenerationConfig,
) -> Result<GenerationStats, FlashgenError> {
    let output = generate(text, config).await?;
    export::write_csv(&output.cards, output_path).await?;
    Ok(output.stats)
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    text: &str,
    config: &GenerationConfig,
) -> Result<GenerationOutput, FlashgenError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| FlashgenError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(generate(text, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the chat backend, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed
///    the backend entirely; used as-is. This is how tests inject stubs.
/// 2. **Explicit credentials** (`config.api_key` + `base_url` + `model`) —
///    an OpenAI-compatible client is built from them.
///
/// There is no environment fallback here: the library owns no env access,
/// callers (CLI, API layer) resolve credentials and pass them in.
fn resolve_provider(config: &GenerationConfig) -> Result<Arc<dyn ChatProvider>, FlashgenError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    match config.api_key.as_deref() {
        Some(key) if !key.is_empty() => Ok(Arc::new(OpenAiCompatProvider::new(
            key,
            &config.base_url,
            &config.model,
            config.temperature,
            config.api_timeout_secs,
        )?)),
        _ => Err(FlashgenError::MissingApiKey),
    }
}

/// Run every chunk with a non-zero quota through generation and
/// normalisation. Zero-quota chunks never touch the LLM; they appear in the
/// result as empty outcomes.
async fn process_chunks(
    chunks: &[String],
    quotas: &[usize],
    provider: Option<&Arc<dyn ChatProvider>>,
    config: &GenerationConfig,
) -> Vec<ProcessedChunk> {
    let total = chunks.len();

    let tasks = chunks.iter().zip(quotas.iter()).enumerate().map(|(idx, (chunk, &quota))| {
        let provider = provider.map(Arc::clone);
        let chunk_num = idx + 1;
        async move {
            if quota == 0 {
                return ProcessedChunk {
                    outcome: ChunkOutcome {
                        chunk_num,
                        requested: 0,
                        produced: 0,
                        duration_ms: 0,
                        retries: 0,
                        error: None,
                    },
                    cards: Vec::new(),
                };
            }

            if let Some(ref cb) = config.progress_callback {
                cb.on_chunk_start(chunk_num, total);
            }

            let raw = match provider {
                Some(ref p) => cards::process_chunk(p, chunk_num, chunk, quota, config).await,
                None => cards::simulate_chunk(chunk_num, chunk, quota),
            };

            let normalized: Vec<Flashcard> = raw
                .cards
                .into_iter()
                .filter_map(normalize::normalize)
                .collect();

            if let Some(ref cb) = config.progress_callback {
                match raw.error {
                    None => cb.on_chunk_complete(chunk_num, total, normalized.len()),
                    Some(ref e) => cb.on_chunk_error(chunk_num, total, &e.to_string()),
                }
            }

            ProcessedChunk {
                outcome: ChunkOutcome {
                    chunk_num,
                    requested: quota,
                    produced: normalized.len(),
                    duration_ms: raw.duration_ms,
                    retries: raw.retries,
                    error: raw.error,
                },
                cards: normalized,
            }
        }
    });

    stream::iter(tasks)
        .buffered(config.concurrency)
        .collect()
        .await
}
