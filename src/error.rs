//! Error types for the flashgen library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`FlashgenError`] — **Fatal**: the generation run cannot proceed at all
//!   (missing API credential, unreadable input file, invalid configuration).
//!   Returned as `Err(FlashgenError)` from the top-level `generate*`
//!   functions, and checked once before any chunk is processed.
//!
//! * [`ChunkError`] — **Non-fatal**: the LLM call for a single chunk failed
//!   (network error, non-2xx response) but the other chunks are fine. Stored
//!   inside [`crate::output::ChunkOutcome`] so callers can inspect partial
//!   success rather than losing the whole run to one bad chunk.
//!
//! A malformed-but-received LLM response is *not* an error at all: the
//! tolerant JSON parser turns it into zero cards for that chunk.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the flashgen library.
///
/// Chunk-level failures use [`ChunkError`] and are stored in
/// [`crate::output::ChunkOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum FlashgenError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// No usable LLM credential: no injected provider, no API key, and the
    /// run is not a pure simulation. Reported before any chunk work begins.
    #[error(
        "No LLM API key configured.\n\
         Set DEEPSEEK_API_KEY or OPENAI_API_KEY, pass an explicit key, or run with simulate enabled."
    )]
    MissingApiKey,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The file is not valid UTF-8 text and not a PDF.
    #[error("Input file '{path}' is neither UTF-8 text nor a PDF")]
    UnsupportedInput { path: PathBuf },

    /// PDF text extraction failed (corrupt file, unsupported encoding).
    #[error("Failed to extract text from PDF '{path}': {detail}")]
    PdfExtractFailed { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single chunk.
///
/// Stored alongside [`crate::output::ChunkOutcome`] when a chunk's LLM call
/// fails. The overall run continues with the next chunk; the failed chunk
/// simply contributes zero cards.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ChunkError {
    /// LLM call failed after all configured retries.
    #[error("Chunk {chunk}: LLM call failed after {retries} retries: {detail}")]
    LlmFailed {
        chunk: usize,
        retries: u32,
        detail: String,
    },
}
