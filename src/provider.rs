//! LLM provider seam: the [`ChatProvider`] trait and the default
//! OpenAI-compatible implementation.
//!
//! The pipeline only ever needs one capability from a model backend: given a
//! system instruction and a user instruction, return free-form text. Keeping
//! that behind an object-safe trait lets tests inject scripted providers and
//! lets callers wrap a provider with middleware (caching, rate-limiting)
//! without the library knowing.
//!
//! [`OpenAiCompatProvider`] speaks the `/chat/completions` wire format used
//! by OpenAI, DeepSeek, Ollama, vLLM, and most self-hosted gateways. The
//! credential and base URL are opaque values handed in by the caller — this
//! module never reads environment variables.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::error::FlashgenError;

/// Errors from a single chat call.
///
/// These are always recovered per-chunk by the pipeline; they never abort a
/// whole generation run.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network-level failure (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// The API answered 2xx but the body did not contain a completion.
    #[error("malformed API response: {0}")]
    MalformedResponse(String),
}

/// A chat-completion backend.
///
/// Implementations must be `Send + Sync`: the pipeline may issue calls for
/// independent chunks concurrently.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send one system + user instruction pair and return the raw response
    /// text. The text is *expected* — not guaranteed — to contain JSON; the
    /// caller runs it through the tolerant parser.
    async fn chat(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}

/// Provider for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiCompatProvider {
    /// Build a provider from opaque credentials and endpoint settings.
    ///
    /// `base_url` is the API root (e.g. `https://api.deepseek.com/v1`);
    /// the `/chat/completions` path is appended here.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout_secs: u64,
    ) -> Result<Self, FlashgenError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FlashgenError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            temperature,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatProvider {
    async fn chat(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": self.temperature,
        });

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Error bodies are not always JSON (gateways return HTML 502s);
            // preserve the status and pass the body through as text.
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        debug!(
            model = %self.model,
            usage = ?payload.get("usage"),
            "chat completion received"
        );

        payload
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|t| t.as_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                ProviderError::MalformedResponse("no choices[0].message.content".into())
            })
    }
}
