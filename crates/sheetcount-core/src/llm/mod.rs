//! LLM integration for sheet counting.
//!
//! Provides a provider abstraction over an OpenAI-compatible vision backend,
//! the prompts sent with each request, and validation of the JSON answer.

pub(crate) mod openai;
pub mod prompt;
pub(crate) mod provider;
pub mod response;

pub use provider::{
    resolve_env_var, ImageInput, LlmProvider, LlmProviderFactory, LlmRequest, LlmResponse,
};
pub use response::{strip_code_fences, validate_response};
