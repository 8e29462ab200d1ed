//! Minimal OpenAI chat-completions client shared by the vision and
//! ranking callers.
//!
//! Uses `reqwest` to call the `/v1/chat/completions` endpoint directly;
//! no streaming, no tools, just a blocking-style request with a fixed
//! timeout so a stuck upstream cannot hang an upload forever.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{PipelineError, Result};

/// The OpenAI chat completions endpoint.
const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// The default chat model.
const DEFAULT_MODEL: &str = "gpt-4o";

/// Per-request timeout. Vision calls on large images are slow; anything
/// beyond this is treated like any other transport failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A thin client over the OpenAI chat completions API.
#[derive(Clone)]
pub struct OpenAiChat {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiChat {
    /// Create a new client with the given API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client, api_key: api_key.into(), model: DEFAULT_MODEL.to_string() }
    }

    /// Override the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Send a chat request and return the first choice's message text.
    ///
    /// `messages` follows the chat API's message array shape; callers
    /// assemble it because the vision call needs a mixed text/image
    /// content part the ranking call does not.
    pub async fn complete(&self, messages: Vec<Value>, max_tokens: u32) -> Result<String> {
        debug!(model = %self.model, max_tokens, "sending chat completion request");

        let request_body = ChatRequest {
            model: &self.model,
            messages,
            max_tokens,
            temperature: 0.1,
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "request failed");
                PipelineError::Model {
                    provider: "OpenAI".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "OpenAI", %status, "API error");
            return Err(PipelineError::Model {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse response");
            PipelineError::Model {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| PipelineError::Model {
                provider: "OpenAI".into(),
                message: "API returned no choices".into(),
            })
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Value>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}
