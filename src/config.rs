//! Configuration types for flashcard generation.
//!
//! All generation behaviour is controlled through [`GenerationConfig`], built
//! via its [`GenerationConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across tasks, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A fifteen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::FlashgenError;
use crate::progress::ProgressCallback;
use crate::provider::ChatProvider;
use std::fmt;
use std::sync::Arc;

/// Configuration for one flashcard-generation run.
///
/// Built via [`GenerationConfig::builder()`] or using
/// [`GenerationConfig::default()`].
///
/// # Example
/// ```rust
/// use flashgen::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .total_cards(20)
///     .difficulty("Advanced")
///     .language("English")
///     .api_key("sk-...")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Maximum chunk length in characters. Default: 2000.
    ///
    /// Sized so that a chunk plus the prompt scaffolding stays comfortably
    /// inside a chat model's context window while still giving the model
    /// enough material to find non-trivial questions.
    pub chunk_size: usize,

    /// Characters of trailing context repeated at the start of the next
    /// chunk. Default: 200.
    ///
    /// A sentence cut at a chunk boundary would otherwise lose the half the
    /// model needs to make sense of it.
    pub chunk_overlap: usize,

    /// Total number of cards to generate across all chunks. Default: 10.
    ///
    /// Distributed over chunks front-loaded: the first `total mod chunks`
    /// chunks get one extra card.
    pub total_cards: usize,

    /// Difficulty label embedded in the prompt, e.g. "Mixed", "Beginner",
    /// "Advanced". Free-form. Default: "Mixed".
    pub difficulty: String,

    /// Card-type label embedded in the prompt, e.g. "Standard",
    /// "True-False". Free-form. Default: "Standard".
    pub card_type: String,

    /// Output language for questions and answers. Free-form. Default: "English".
    pub language: String,

    /// Chat model identifier. Default: "deepseek-chat".
    pub model: String,

    /// Sampling temperature. Default: 0.2.
    ///
    /// Low but non-zero: cards should be faithful to the source text yet
    /// phrased with some variety.
    pub temperature: f32,

    /// LLM API key, resolved by the caller. The library never reads
    /// environment variables. Default: None.
    pub api_key: Option<String>,

    /// API root for OpenAI-compatible endpoints.
    /// Default: "https://api.deepseek.com/v1".
    pub base_url: String,

    /// Pre-constructed provider. Takes precedence over `api_key`/`base_url`.
    /// This is how tests inject scripted backends.
    pub provider: Option<Arc<dyn ChatProvider>>,

    /// Offline simulation mode: derive placeholder cards from chunk
    /// sentences without any LLM call. No credential required. Default: false.
    pub simulate: bool,

    /// Number of chunk LLM calls in flight at once. Default: 1.
    ///
    /// The pipeline is sequential by default so output cost and rate limits
    /// stay predictable; raising this fans chunk calls out concurrently and
    /// the driver re-sorts results into source order before returning.
    pub concurrency: usize,

    /// Retries per chunk on a failed LLM call. Default: 0.
    ///
    /// A failed chunk yields zero cards either way; retries only trade
    /// latency for completeness.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (doubles per attempt). Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-LLM-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Optional progress callback receiving per-chunk events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            chunk_overlap: 200,
            total_cards: 10,
            difficulty: "Mixed".to_string(),
            card_type: "Standard".to_string(),
            language: "English".to_string(),
            model: "deepseek-chat".to_string(),
            temperature: 0.2,
            api_key: None,
            base_url: "https://api.deepseek.com/v1".to_string(),
            provider: None,
            simulate: false,
            concurrency: 1,
            max_retries: 0,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("total_cards", &self.total_cards)
            .field("difficulty", &self.difficulty)
            .field("card_type", &self.card_type)
            .field("language", &self.language)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn ChatProvider>"))
            .field("simulate", &self.simulate)
            .field("concurrency", &self.concurrency)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn chunk_size(mut self, n: usize) -> Self {
        self.config.chunk_size = n.max(1);
        self
    }

    pub fn chunk_overlap(mut self, n: usize) -> Self {
        self.config.chunk_overlap = n;
        self
    }

    pub fn total_cards(mut self, n: usize) -> Self {
        self.config.total_cards = n;
        self
    }

    pub fn difficulty(mut self, v: impl Into<String>) -> Self {
        self.config.difficulty = v.into();
        self
    }

    pub fn card_type(mut self, v: impl Into<String>) -> Self {
        self.config.card_type = v.into();
        self
    }

    pub fn language(mut self, v: impl Into<String>) -> Self {
        self.config.language = v.into();
        self
    }

    pub fn model(mut self, v: impl Into<String>) -> Self {
        self.config.model = v.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn simulate(mut self, v: bool) -> Self {
        self.config.simulate = v;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, FlashgenError> {
        let c = &self.config;
        if c.chunk_size == 0 {
            return Err(FlashgenError::InvalidConfig(
                "chunk_size must be ≥ 1".into(),
            ));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(FlashgenError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        if c.concurrency == 0 {
            return Err(FlashgenError::InvalidConfig(
                "concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_parameters() {
        let c = GenerationConfig::default();
        assert_eq!(c.chunk_size, 2000);
        assert_eq!(c.chunk_overlap, 200);
        assert_eq!(c.total_cards, 10);
        assert_eq!(c.difficulty, "Mixed");
        assert_eq!(c.card_type, "Standard");
        assert_eq!(c.model, "deepseek-chat");
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.max_retries, 0);
    }

    #[test]
    fn builder_rejects_overlap_ge_chunk_size() {
        let result = GenerationConfig::builder()
            .chunk_size(100)
            .chunk_overlap(100)
            .build();
        assert!(matches!(result, Err(FlashgenError::InvalidConfig(_))));
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = GenerationConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = GenerationConfig::builder().api_key("sk-secret").build().unwrap();
        let s = format!("{c:?}");
        assert!(!s.contains("sk-secret"));
        assert!(s.contains("<redacted>"));
    }
}
