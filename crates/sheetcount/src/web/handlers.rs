//! HTTP handlers for the single-page UI and its JSON endpoints.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use serde::Serialize;
use sheetcount_core::{Analysis, ImageInfo};

use super::error::{AppError, AppResult};
use super::state::AppState;

/// Multipart field carrying the image.
const UPLOAD_FIELD: &str = "file";

const INDEX_HTML: &str = include_str!("../../assets/index.html");

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// What the configuration sidebar shows.
#[derive(Serialize)]
pub struct StatusResponse {
    api_configured: bool,
    model: String,
    max_file_size_mb: u64,
    supported_formats: Vec<String>,
}

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/status
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let config = state.counter.config();
    Json(StatusResponse {
        api_configured: state.counter.is_configured(),
        model: state.counter.model().to_string(),
        max_file_size_mb: config.limits.max_file_size_mb,
        supported_formats: config.upload.supported_formats.clone(),
    })
}

/// POST /api/inspect
///
/// Decode the upload and return the image information panel.
pub async fn inspect(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<ImageInfo>> {
    let (file_name, bytes) = read_upload(multipart).await?;
    let info = state.counter.inspect(bytes, &file_name).await?;
    Ok(Json(info))
}

/// POST /api/analyze
///
/// Run the full analysis: normalize, call the model, validate the answer.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<Analysis>> {
    let (file_name, bytes) = read_upload(multipart).await?;
    let analysis = state.counter.analyze(bytes, &file_name).await?;
    tracing::info!(
        file_name = %analysis.image.file_name,
        total = analysis.result.total,
        accuracy_percent = ?analysis.result.accuracy_percent(),
        "Analysis complete"
    );
    Ok(Json(analysis))
}

/// Pull the `file` field out of a multipart body.
async fn read_upload(mut multipart: Multipart) -> AppResult<(String, Vec<u8>)> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or("upload")
            .to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        return Ok((file_name, data.to_vec()));
    }

    Err(AppError::BadRequest(format!(
        "multipart field '{UPLOAD_FIELD}' is required"
    )))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}
