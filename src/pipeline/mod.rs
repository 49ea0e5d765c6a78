//! Pipeline stages for flashcard generation.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different chunking strategy) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ chunk ──▶ allocate ──▶ cards ──▶ parse ──▶ normalize
//! (file)    (split)   (quotas)    (LLM)     (JSON)    (schema)
//! ```
//!
//! 1. [`input`]     — load a local text or PDF file into plain text
//! 2. [`chunk`]     — split long text into overlapping, bounded chunks at
//!    natural separators
//! 3. [`allocate`]  — distribute the requested card count across chunks so
//!    quotas sum exactly
//! 4. [`cards`]     — drive the LLM call per chunk; the only stage with
//!    network I/O
//! 5. [`parse`]     — tolerantly extract a JSON `cards` object from raw
//!    model output
//! 6. [`normalize`] — coerce raw records into the canonical flashcard
//!    schema, dropping invalid ones

pub mod allocate;
pub mod cards;
pub mod chunk;
pub mod input;
pub mod normalize;
pub mod parse;
