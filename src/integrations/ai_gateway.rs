//! Client for an OpenAI-compatible chat-completion gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::config::ServerConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_TOKENS: u32 = 1500;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("AI gateway is not configured")]
    NotConfigured,
    #[error("request to AI gateway failed: {0}")]
    Http(String),
    #[error("AI gateway responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("AI gateway returned no content")]
    EmptyResponse,
}

/// Produces text for a system prompt and a user prompt.
#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GatewayError>;

    /// Model identifier recorded alongside generated documents.
    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    /// `None` when no gateway URL is configured.
    endpoint: Option<String>,
    api_key: Option<String>,
    model: String,
}

impl GatewayClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Http(format!("failed to create HTTP client: {e}")))?;

        let base_url = base_url.trim().trim_end_matches('/');
        let endpoint = (!base_url.is_empty()).then(|| format!("{base_url}/chat/completions"));
        if endpoint.is_none() {
            log::warn!("AI gateway URL is empty; document generation is disabled");
        }

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: model.into(),
        })
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, GatewayError> {
        Self::new(
            &config.ai_gateway_url,
            config.ai_api_key.clone(),
            config.ai_model.clone(),
        )
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

#[async_trait]
impl DocumentGenerator for GatewayClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GatewayError> {
        let endpoint = self.endpoint.as_deref().ok_or(GatewayError::NotConfigured)?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: 0.3,
        };

        let mut builder = self
            .client
            .post(endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|err| err.error.message)
                .unwrap_or(body);
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message,
            });
        }

        parse_completion(&body)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn parse_completion(body: &str) -> Result<String, GatewayError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::Http(format!("invalid response: {e}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(GatewayError::EmptyResponse)
}
