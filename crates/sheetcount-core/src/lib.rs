//! Sheetcount Core - counting coloured sheet stacks with a vision model.
//!
//! Sheetcount does no image analysis of its own. It normalizes an upload,
//! forwards it to an OpenAI-compatible vision API with a counting prompt, and
//! validates the JSON that comes back.
//!
//! # Architecture
//!
//! ```text
//! Upload → Validate → Decode → Normalize (JPEG, base64) → Chat completion → Validate answer
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use sheetcount_core::{Config, SheetCounter};
//!
//! #[tokio::main]
//! async fn main() -> sheetcount_core::Result<()> {
//!     let counter = SheetCounter::new(Config::load()?)?;
//!     let bytes = std::fs::read("stacks.png")?;
//!     let analysis = counter.analyze(bytes, "stacks.png").await?;
//!     println!("Total: {}", analysis.result.total);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, ResponseError, Result, SheetError};
pub use llm::{validate_response, LlmProvider, LlmProviderFactory};
pub use output::OutputWriter;
pub use types::{Analysis, AnalysisReport, AnalysisResult, ErrorReport, ImageInfo};

use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use llm::{prompt, LlmRequest};
use pipeline::{ImageDecoder, Normalizer, Validator};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sheet counter - the main entry point for analysing uploads.
///
/// Holds no per-request state; one instance serves every request.
pub struct SheetCounter {
    config: Config,
    validator: Validator,
    decoder: ImageDecoder,
    provider: Option<Arc<dyn LlmProvider>>,
    system_prompt: String,
}

impl SheetCounter {
    /// Create a counter from configuration.
    ///
    /// A missing API key is not an error here: the counter starts unconfigured
    /// and every analysis reports the missing credential instead.
    pub fn new(config: Config) -> Result<Self> {
        let timeout = Duration::from_millis(config.limits.llm_timeout_ms);
        let provider = match LlmProviderFactory::create(&config.llm, timeout) {
            Ok(provider) => Some(Arc::<dyn LlmProvider>::from(provider)),
            Err(PipelineError::MissingCredential { provider }) => {
                tracing::warn!("{provider} API key not found; analysis is disabled");
                None
            }
            Err(e) => return Err(e.into()),
        };
        Self::build(config, provider)
    }

    /// Create a counter that sends requests to the given provider.
    pub fn with_provider(config: Config, provider: Arc<dyn LlmProvider>) -> Result<Self> {
        Self::build(config, Some(provider))
    }

    fn build(config: Config, provider: Option<Arc<dyn LlmProvider>>) -> Result<Self> {
        config.validate()?;
        let system_prompt = prompt::load_system_prompt(config.system_prompt_path().as_deref())?;
        tracing::debug!("Initializing Sheetcount v{}", VERSION);
        Ok(Self {
            validator: Validator::new(config.limits.clone(), config.upload.clone()),
            decoder: ImageDecoder::new(config.limits.clone()),
            config,
            provider,
            system_prompt,
        })
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether an API credential was found.
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Model that analyses are sent to.
    pub fn model(&self) -> &str {
        self.provider
            .as_deref()
            .map(|p| p.model())
            .unwrap_or(self.config.llm.model.as_str())
    }

    /// Validate and decode an upload, returning what the info panel shows.
    pub async fn inspect(&self, bytes: Vec<u8>, file_name: &str) -> Result<ImageInfo> {
        self.validator.validate(&bytes, file_name)?;
        let decoded = self.decoder.decode_from_bytes(bytes, file_name).await?;
        Ok(decoded.info())
    }

    /// Run the full analysis for an upload.
    pub async fn analyze(&self, bytes: Vec<u8>, file_name: &str) -> Result<Analysis> {
        self.validator.validate(&bytes, file_name)?;
        let decoded = self.decoder.decode_from_bytes(bytes, file_name).await?;
        let image = decoded.info();
        tracing::info!(
            file_name,
            width = image.width,
            height = image.height,
            mode = %image.mode,
            "Analyzing image"
        );
        let result = self.analyze_image(decoded.image, file_name).await?;
        Ok(Analysis { image, result })
    }

    /// Normalize an already-decoded image, send it to the model and validate
    /// the answer.
    pub async fn analyze_image(
        &self,
        image: DynamicImage,
        file_name: &str,
    ) -> Result<AnalysisResult> {
        let provider = self
            .provider
            .clone()
            .ok_or_else(|| PipelineError::MissingCredential {
                provider: "OpenAI".to_string(),
            })?;

        let input = self.normalize(image, file_name).await?;
        let request =
            LlmRequest::count_sheets(input, self.system_prompt.clone(), self.config.llm.max_tokens);

        let response = provider.generate(&request).await?;
        tracing::debug!(
            provider = provider.name(),
            model = %response.model,
            latency_ms = response.latency_ms,
            tokens = ?response.tokens_used,
            "Model answered"
        );

        validate_response(&response.text).map_err(|e| {
            tracing::warn!(error = %e, "Rejected model answer");
            e.into()
        })
    }

    /// Flatten and encode on the blocking pool, bounded by the decode timeout.
    async fn normalize(&self, image: DynamicImage, file_name: &str) -> Result<llm::ImageInput> {
        let normalizer = Normalizer::new(self.config.normalize.clone());
        let name = file_name.to_string();
        let timeout_ms = self.config.limits.decode_timeout_ms;

        let encoded = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            tokio::task::spawn_blocking(move || normalizer.normalize(image, &name)),
        )
        .await;

        match encoded {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(e)) => Err(PipelineError::Encode {
                file_name: file_name.to_string(),
                message: format!("Task join error: {e}"),
            }
            .into()),
            Err(_) => Err(PipelineError::Timeout {
                file_name: file_name.to_string(),
                stage: "encode".to_string(),
                timeout_ms,
            }
            .into()),
        }
    }
}
