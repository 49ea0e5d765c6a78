//! # flashgen
//!
//! Generate study flashcards from documents using chat LLMs.
//!
//! ## Why this crate?
//!
//! Turning a long document into a usable flashcard deck by hand is tedious:
//! the text must be cut into pieces a model can digest, the desired deck size
//! spread across those pieces, and the model's loosely formatted replies
//! coerced into clean question/answer records. This crate packages that whole
//! pipeline — chunking, card budgeting, prompt construction, tolerant JSON
//! parsing, and normalisation — behind one async call, with CSV export and a
//! CLI on top.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Text / PDF
//!  │
//!  ├─ 1. Input      read local file, extract text from PDFs
//!  ├─ 2. Chunk      paragraph-first split with character overlap
//!  ├─ 3. Allocate   spread the card budget across chunks, front-loaded
//!  ├─ 4. Generate   one chat call per chunk (concurrent, optionally retried)
//!  ├─ 5. Parse      tolerant JSON extraction from fenced / chatty replies
//!  ├─ 6. Normalise  trim, default, and drop invalid records
//!  └─ 7. Output     ordered deck + per-chunk outcomes + run stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flashgen::{generate, GenerationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GenerationConfig::builder()
//!         .api_key(std::env::var("DEEPSEEK_API_KEY")?)
//!         .total_cards(20)
//!         .build()?;
//!     let output = generate("…lecture notes…", &config).await?;
//!     for card in &output.cards {
//!         println!("Q: {}\nA: {}\n", card.question, card.answer);
//!     }
//!     eprintln!("{}/{} cards, {} chunks failed",
//!         output.stats.produced_cards,
//!         output.stats.requested_cards,
//!         output.stats.failed_chunks);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `flashgen` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! flashgen = { version = "0.3", default-features = false }
//! ```
//!
//! ## Bring Your Own Backend
//!
//! Any OpenAI-compatible chat endpoint works out of the box via `api_key` +
//! `base_url` + `model`. For anything else — or for tests — implement
//! [`ChatProvider`] and hand it to the builder with
//! [`GenerationConfigBuilder::provider`]; the library never reads the
//! environment itself.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod export;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod provider;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GenerationConfig, GenerationConfigBuilder};
pub use error::{ChunkError, FlashgenError};
pub use export::{to_csv, write_csv};
pub use generate::{generate, generate_from_file, generate_sync, generate_to_csv};
pub use output::{ChunkOutcome, Flashcard, GenerationOutput, GenerationStats};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use provider::{ChatProvider, OpenAiCompatProvider, ProviderError};
