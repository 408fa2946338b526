//! OpenAI-compatible chat completion gateway.
//!
//! Works against Open WebUI, OpenAI, or anything else that accepts
//! `POST {url}` with a `messages` array and answers with `choices`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, header};
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, Result};

/// Default timeout for a completion request.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Reply used when the gateway answered without a usable choice.
pub const NO_REPLY_TEXT: &str = "Sorry, I couldn't process your request.";

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the completion gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Full chat-completions URL.
    pub url: String,
    /// Bearer token.
    pub api_key: Option<String>,
    /// Model name sent with every request.
    pub model: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Create a config for the given URL and model.
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            model: model.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend trait
// ─────────────────────────────────────────────────────────────────────────────

/// Something that turns a system prompt and a user message into reply text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Ask for a single reply.
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String>;

    /// Model name, for status output.
    fn model(&self) -> &str;
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice: `message.content`, else `text`.
    fn reply_text(&self) -> Option<String> {
        let choice = self.choices.first()?;
        choice
            .message
            .as_ref()
            .and_then(|m| m.content.as_deref())
            .or(choice.text.as_deref())
            .map(|text| text.trim().to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gateway
// ─────────────────────────────────────────────────────────────────────────────

/// OpenAI-compatible completion gateway.
pub struct OpenAiGateway {
    client: Client,
    config: GatewayConfig,
}

impl OpenAiGateway {
    /// Create a gateway with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(LlmError::Config("gateway URL is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Gateway configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn add_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header(header::CONTENT_TYPE, "application/json");

        if let Some(ref api_key) = self.config.api_key {
            builder.header(header::AUTHORIZATION, format!("Bearer {}", api_key))
        } else {
            builder
        }
    }

    async fn handle_response(response: Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Auth(body),
                code => LlmError::Backend {
                    status: code,
                    message: body,
                },
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)?;

        Ok(parsed.reply_text().unwrap_or_else(|| {
            tracing::warn!("gateway reply had no usable choice");
            NO_REPLY_TEXT.to_string()
        }))
    }
}

#[async_trait]
impl CompletionBackend for OpenAiGateway {
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_text,
                },
            ],
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_chars = system_prompt.len(),
            "sending completion request"
        );

        let response = self
            .add_headers(self.client.post(&self.config.url))
            .json(&request)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
