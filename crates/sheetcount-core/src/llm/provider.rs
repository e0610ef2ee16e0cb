//! LLM provider trait and request/response types.
//!
//! Defines the interface the vision backend implements, plus the factory that
//! builds it from config.

use crate::config::LlmConfig;
use crate::error::PipelineError;
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

/// Base64-encoded image ready to send to an LLM API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type of the encoded bytes
    pub media_type: String,
}

impl ImageInput {
    /// Wrap JPEG bytes for transport.
    pub fn jpeg(bytes: &[u8]) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: "image/jpeg".to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A request to count the sheets in an image.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// The image to analyse
    pub image: ImageInput,
    /// System prompt carrying the counting rules
    pub system: String,
    /// User turn sent alongside the image
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl LlmRequest {
    /// Build a counting request from an image and the system prompt.
    pub fn count_sheets(image: ImageInput, system: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            image,
            system: system.into(),
            prompt: super::prompt::USER_PROMPT.to_string(),
            max_tokens,
        }
    }
}

/// The raw response from an LLM call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text, trimmed
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that LLM providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Arc<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging and error messages (e.g., "OpenAI").
    fn name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Send the request and return the model's text.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, PipelineError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Factory that creates the provider from config.
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create the OpenAI-compatible provider described by `config`.
    ///
    /// Fails with [`PipelineError::MissingCredential`] when no API key resolves.
    pub fn create(
        config: &LlmConfig,
        timeout: Duration,
    ) -> Result<Box<dyn LlmProvider>, PipelineError> {
        let api_key =
            resolve_env_var(&config.api_key).ok_or_else(|| PipelineError::MissingCredential {
                provider: "OpenAI".to_string(),
            })?;
        Ok(Box::new(super::openai::OpenAiProvider::with_endpoint(
            &api_key,
            &config.model,
            &config.endpoint,
            timeout,
        )))
    }
}
