//! Error types for the Sheetcount analysis pipeline.
//!
//! Errors are organized by stage so every failure can be shown to the user as a
//! single human-readable message: configuration, image handling and the
//! upstream call, and validation of the model's answer.

use thiserror::Error;

/// Top-level error type for Sheetcount operations.
#[derive(Error, Debug)]
pub enum SheetError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image handling or upstream call errors
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The model answered, but the answer failed validation
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while preparing an upload and sending it to the model.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Upload contained no bytes
    #[error("Uploaded file {file_name} is empty")]
    EmptyUpload { file_name: String },

    /// Image decoding failed
    #[error("Error processing image {file_name}: {message}")]
    Decode { file_name: String, message: String },

    /// JPEG re-encoding failed
    #[error("Failed to encode {file_name} as JPEG: {message}")]
    Encode { file_name: String, message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {file_name} after {timeout_ms}ms")]
    Timeout {
        file_name: String,
        stage: String,
        timeout_ms: u64,
    },

    /// Upload exceeds size limit
    #[error("File too large: {file_name} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        file_name: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {file_name} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        file_name: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Unsupported image format
    #[error("Unsupported format for {file_name}: {format}")]
    UnsupportedFormat { file_name: String, format: String },

    /// No API key could be resolved for the provider
    #[error("{provider} API key not found. Please check your .env file.")]
    MissingCredential { provider: String },

    /// Upstream request failed or returned a non-success status
    #[error("API request failed: {message}")]
    Llm {
        message: String,
        status_code: Option<u16>,
    },
}

/// Validation failures for the JSON answer returned by the model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// The text was not valid JSON, even after stripping code fences
    #[error("Invalid JSON response from OpenAI: {raw}")]
    InvalidJson { raw: String },

    /// Not an object, or one of the four required keys is missing
    #[error("Invalid response format from OpenAI API")]
    InvalidFormat,

    /// `sheets_present` is not a boolean
    #[error("Invalid sheets_present value in response")]
    InvalidSheetsPresent,

    /// `colours` is not an object of integer counts
    #[error("Invalid colours format in response")]
    InvalidColours,

    /// `total` is not an integer
    #[error("Invalid total value in response")]
    InvalidTotal,

    /// Per-colour counts do not add up to `total`
    #[error("Total mismatch: colours sum ({sum}) != total ({total})")]
    TotalMismatch { sum: i128, total: i64 },
}

/// Convenience type alias for Sheetcount results.
pub type Result<T> = std::result::Result<T, SheetError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_message() {
        let err = PipelineError::MissingCredential {
            provider: "OpenAI".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "OpenAI API key not found. Please check your .env file."
        );
    }

    #[test]
    fn test_mismatch_message_names_both_values() {
        let err = ResponseError::TotalMismatch { sum: 65, total: 64 };
        assert_eq!(
            err.to_string(),
            "Total mismatch: colours sum (65) != total (64)"
        );
    }

    #[test]
    fn test_transparent_wrapping_keeps_message() {
        let err: SheetError = ResponseError::InvalidFormat.into();
        assert_eq!(err.to_string(), "Invalid response format from OpenAI API");
    }
}
