use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sheetcount_core::{PipelineError, SheetError};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`SheetError`] for analysis failures and adds HTTP-specific variants.
/// Every variant renders as `{"error": ..., "code": ...}` so the page can show
/// any failure the same way.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A failure from the analysis pipeline.
    #[error(transparent)]
    Sheet(#[from] SheetError),

    /// A malformed upload request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body exceeded the upload limit.
    #[error("{0}")]
    PayloadTooLarge(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Sheet(err) => classify_sheet_error(err),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, code, "Request failed");
        } else {
            tracing::warn!(error = %self, code, "Request rejected");
        }

        let body = json!({
            "error": self.to_string(),
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map an analysis failure to an HTTP status and a stable error code.
fn classify_sheet_error(err: &SheetError) -> (StatusCode, &'static str) {
    match err {
        SheetError::Pipeline(pipeline) => match pipeline {
            PipelineError::EmptyUpload { .. } | PipelineError::Decode { .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_IMAGE")
            }
            PipelineError::FileTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE"),
            PipelineError::ImageTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "IMAGE_TOO_LARGE")
            }
            PipelineError::UnsupportedFormat { .. } => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_FORMAT")
            }
            PipelineError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            PipelineError::MissingCredential { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "MISSING_CREDENTIAL")
            }
            PipelineError::Llm { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            PipelineError::Encode { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        },
        SheetError::Response(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_MODEL_RESPONSE"),
        SheetError::Config(_) | SheetError::Io(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}
