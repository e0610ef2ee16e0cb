//! OpenAI provider using the Chat Completions API.
//!
//! Sends the counting rules as a system message and the image via data URL in
//! the user message content array.

use super::provider::{LlmProvider, LlmRequest, LlmResponse};
use crate::error::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// OpenAI provider using Chat Completions API.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl OpenAiProvider {
    /// Create a provider for any OpenAI-compatible chat-completion endpoint.
    pub fn with_endpoint(api_key: &str, model: &str, endpoint: &str, timeout: Duration) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            timeout,
        }
    }

    fn build_body(&self, request: &LlmRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: MessageContent::Text(request.system.clone()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: MessageContent::Parts(vec![
                        ChatContent::Text {
                            text: request.prompt.clone(),
                        },
                        ChatContent::ImageUrl {
                            image_url: ImageUrl {
                                url: request.image.data_url(),
                            },
                        },
                    ]),
                },
            ],
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ChatContent>),
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: String,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice.
    fn first_text(&self) -> Result<String, PipelineError> {
        let choice = self.choices.first().ok_or_else(|| PipelineError::Llm {
            message: "OpenAI returned empty choices array, no content generated".to_string(),
            status_code: None,
        })?;

        match (&choice.message.content, &choice.message.refusal) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(refusal)) => Err(PipelineError::Llm {
                message: format!("OpenAI refused the request: {refusal}"),
                status_code: None,
            }),
            (None, None) => Err(PipelineError::Llm {
                message: "OpenAI returned a choice with no message content".to_string(),
                status_code: None,
            }),
        }
    }
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, PipelineError> {
        let start = Instant::now();
        let body = self.build_body(request);

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| PipelineError::Llm {
                message: e.to_string(),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Llm {
                message: format!("OpenAI HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| PipelineError::Llm {
            message: format!("Failed to parse OpenAI response: {e}"),
            status_code: None,
        })?;

        let text = chat_resp.first_text()?;

        Ok(LlmResponse {
            text: text.trim().to_string(),
            model: chat_resp.model,
            tokens_used: chat_resp.usage.map(|u| u.total_tokens),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::ImageInput;

    #[test]
    fn test_request_body_shape() {
        let provider = OpenAiProvider::with_endpoint(
            "sk-test",
            "gpt-4o",
            "https://api.openai.com/v1/chat/completions",
            Duration::from_secs(60),
        );
        let image = ImageInput::jpeg(&[1, 2, 3]);
        let request = LlmRequest::count_sheets(image, "rules", 300);

        let body = serde_json::to_value(provider.build_body(&request)).unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "rules");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"][0]["type"], "text");
        assert_eq!(body["messages"][1]["content"][1]["type"], "image_url");
        assert_eq!(
            body["messages"][1]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,AQID"
        );
    }

    #[test]
    fn test_response_parsing_tolerates_missing_usage() {
        let json = r#"{"model":"gpt-4o","choices":[{"message":{"content":" {} "}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.usage.is_none());
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some(" {} "));
    }

    #[test]
    fn test_empty_choices_and_null_content_are_distinct() {
        let empty: ChatResponse = serde_json::from_str(r#"{"model":"gpt-4o","choices":[]}"#).unwrap();
        let err = empty.first_text().unwrap_err().to_string();
        assert!(err.contains("empty choices array"));

        let null: ChatResponse =
            serde_json::from_str(r#"{"model":"gpt-4o","choices":[{"message":{"content":null}}]}"#)
                .unwrap();
        let err = null.first_text().unwrap_err().to_string();
        assert!(err.contains("no message content"));
        assert!(!err.contains("empty choices"));

        let refused: ChatResponse = serde_json::from_str(
            r#"{"model":"gpt-4o","choices":[{"message":{"content":null,"refusal":"I can't help with that."}}]}"#,
        )
        .unwrap();
        assert_eq!(
            refused.first_text().unwrap_err().to_string(),
            "API request failed: OpenAI refused the request: I can't help with that."
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let provider = OpenAiProvider::with_endpoint(
            "sk-test",
            "gpt-4o",
            "http://127.0.0.1:9/v1/chat/completions",
            Duration::from_secs(2),
        );
        let request = LlmRequest::count_sheets(ImageInput::jpeg(&[1]), "rules", 10);

        let err = provider.generate(&request).await.unwrap_err();
        assert!(err.to_string().starts_with("API request failed: "));
        match err {
            PipelineError::Llm { status_code, .. } => assert!(status_code.is_none()),
            other => panic!("expected Llm error, got {other:?}"),
        }
    }
}
