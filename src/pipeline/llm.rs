//! LLM interaction: build chat-completion requests and call the endpoint.
//!
//! One piece of text becomes one chat-completion call. Prompt wording lives
//! in [`crate::prompts`], response cleanup in [`crate::pipeline::sanitize`].
//!
//! ## Failure contract
//!
//! Nothing here panics or propagates to the receive loop. Connection
//! failures, timeouts, non-JSON bodies and JSON without `choices` all come
//! back as an [`LlmError`] whose `Display` form is the text the user gets in
//! place of a reply (see [`reply_text`]). No retry, no backoff.

use crate::config::BotConfig;
use crate::error::{DocBriefError, LlmError};
use crate::pipeline::sanitize::sanitize;
use crate::prompts::{summary_prompt, SYSTEM_PROMPT};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// What the bot needs from a language model.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Summarise extracted document text.
    async fn summarize(&self, text: &str) -> Result<String, LlmError>;

    /// Reply to a free-form chat message.
    async fn chat(&self, message: &str) -> Result<String, LlmError>;
}

/// Collapse an assistant result into the text sent to the user.
pub fn reply_text(result: Result<String, LlmError>) -> String {
    result.unwrap_or_else(|e| e.to_string())
}

/// A chat message in the request body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Chat-completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    /// The fixed system instruction followed by one user turn.
    pub fn new(model: &str, user_content: impl Into<String>) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(user_content),
            ],
        }
    }
}

/// HTTP client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    url: String,
    model: String,
    api_key: String,
}

impl LlmClient {
    /// Build a client for `url` with a whole-request `timeout`.
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DocBriefError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Build a client from the bot configuration.
    pub fn from_config(config: &BotConfig) -> Result<Self, DocBriefError> {
        Self::new(
            config.llm_url.clone(),
            config.llm_model.clone(),
            config.llm_api_key.clone(),
            Duration::from_secs(config.llm_timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one request and return the sanitised first choice.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let start = Instant::now();
        let payload =
            serde_json::to_vec(request).map_err(|e| LlmError::Transport(e.to_string()))?;

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                warn!("LLM request failed: {}", e);
                LlmError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        debug!(
            "LLM answered HTTP {} with {} bytes in {:?}",
            status.as_u16(),
            body.len(),
            start.elapsed()
        );

        let content = parse_completion(&body)?;
        Ok(sanitize(&content))
    }
}

#[async_trait]
impl Assistant for LlmClient {
    async fn summarize(&self, text: &str) -> Result<String, LlmError> {
        let request = CompletionRequest::new(&self.model, summary_prompt(text));
        self.complete(&request).await
    }

    async fn chat(&self, message: &str) -> Result<String, LlmError> {
        let request = CompletionRequest::new(&self.model, message);
        self.complete(&request).await
    }
}

/// Pull `choices[0].message.content` out of a response body.
///
/// The HTTP status is not consulted; only the shape of the body decides.
pub fn parse_completion(body: &str) -> Result<String, LlmError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        warn!("LLM body is not JSON: {}", e);
        LlmError::MalformedBody {
            body: body.to_string(),
            detail: e.to_string(),
        }
    })?;

    value
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.pointer("/message/content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            warn!("LLM response has no choices");
            LlmError::UnexpectedResponse {
                body: body.to_string(),
            }
        })
}
