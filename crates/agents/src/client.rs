//! Minimal client for an OpenAI-compatible chat-completions API.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::AnalyzerError;

/// Default completions endpoint base.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for financial analysis.
const DEFAULT_MODEL: &str = "gpt-4";

/// Low temperature for deterministic analysis output.
const TEMPERATURE: f32 = 0.2;

/// LLM connection settings, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API base URL (`OPENAI_BASE_URL`, default the public OpenAI API).
    pub base_url: String,
    /// Bearer token (`OPENAI_API_KEY`, required).
    pub api_key: String,
    /// Model name (`OPENAI_MODEL`, default `gpt-4`).
    pub model: String,
}

impl LlmConfig {
    /// Load configuration from environment variables.
    ///
    /// Panics when `OPENAI_API_KEY` is missing — the worker cannot do
    /// anything useful without it and should fail fast at startup.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set");
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Self {
            base_url,
            api_key,
            model,
        }
    }
}

/// One chat message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Thin wrapper over `reqwest` for chat completions.
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Run one chat completion and return the first choice's content.
    ///
    /// Aborts with [`AnalyzerError::Cancelled`] when `cancel` fires while
    /// the request is in flight.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        cancel: &CancellationToken,
    ) -> Result<String, AnalyzerError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let request = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&ChatRequest {
                model: &self.config.model,
                temperature: TEMPERATURE,
                messages,
            })
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(AnalyzerError::Cancelled),
            result = request => result.map_err(|e| AnalyzerError::Upstream(e.to_string()))?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::Upstream(format!(
                "completions request returned {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::Upstream(format!("malformed completions response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AnalyzerError::Upstream("completions response had no choices".into()))
    }
}
