#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use sheetcount::web::{build_app_router, AppState};
use sheetcount_core::llm::{LlmRequest, LlmResponse};
use sheetcount_core::{Config, LlmProvider, PipelineError, SheetCounter};
use tower::ServiceExt;

/// Multipart boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "sheetcount-test-boundary";

/// A provider that returns a fixed reply instead of calling an API.
pub struct ScriptedProvider {
    reply: Result<String, u16>,
}

impl ScriptedProvider {
    pub fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self { reply: Err(status) })
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-vision"
    }

    async fn generate(&self, _request: &LlmRequest) -> Result<LlmResponse, PipelineError> {
        match &self.reply {
            Ok(text) => Ok(LlmResponse {
                text: text.clone(),
                model: "scripted-vision".to_string(),
                tokens_used: None,
                latency_ms: 0,
            }),
            Err(status) => Err(PipelineError::Llm {
                message: format!("HTTP {status}: upstream unavailable"),
                status_code: Some(*status),
            }),
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }
}

/// Build the application router around a scripted provider.
pub fn build_test_app(provider: Arc<ScriptedProvider>) -> Router {
    build_test_app_with(Config::default(), provider)
}

/// Build the application router from a custom configuration.
pub fn build_test_app_with(config: Config, provider: Arc<ScriptedProvider>) -> Router {
    let counter = SheetCounter::with_provider(config.clone(), provider).unwrap();
    build_app_router(AppState::new(counter), &config)
}

/// Build the application router with no API key available.
pub fn build_unconfigured_app() -> Router {
    let mut config = Config::default();
    config.llm.api_key = "${SHEETCOUNT_TEST_KEY_THAT_IS_NEVER_SET}".to_string();
    let counter = SheetCounter::new(config.clone()).unwrap();
    build_app_router(AppState::new(counter), &config)
}

/// A small RGBA PNG with a transparent band, like a cut-out photo.
pub fn sample_png() -> Vec<u8> {
    let img = RgbaImage::from_fn(32, 24, |x, _| {
        if x < 8 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([30, 160, 60, 255])
        }
    });
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

/// Encode one file part as a multipart/form-data body.
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a file as the `file` field of a multipart form.
pub async fn post_file(app: Router, uri: &str, file_name: &str, data: &[u8]) -> Response<Body> {
    post_multipart(app, uri, multipart_body("file", file_name, "image/png", data)).await
}

/// POST a prepared multipart body.
pub async fn post_multipart(app: Router, uri: &str, body: Vec<u8>) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
