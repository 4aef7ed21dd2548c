use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const API_VERSION: &str = "2023-06-01";

/// Errors that can occur when calling the reasoning service
#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Reasoning call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Reasoning service is disabled")]
    Disabled,
}

/// Text completion backend used for scoring and persona generation
#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ReasoningError>;
}

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// HTTP client for a messages-style completion API
pub struct ReasoningClient {
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    client: Client,
}

impl ReasoningClient {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        max_tokens: u32,
        request_timeout: Duration,
    ) -> Result<Self, ReasoningError> {
        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            model,
            max_tokens,
            client,
        })
    }
}

#[async_trait]
impl ReasoningService for ReasoningClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ReasoningError> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));

        let body = MessageRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(ReasoningError::Unauthorized),
            s => {
                return Err(ReasoningError::ApiError(format!(
                    "Completion request failed: {}",
                    s
                )))
            }
        }

        let parsed: MessageResponse = response
            .json()
            .await
            .map_err(|e| ReasoningError::InvalidResponse(e.to_string()))?;

        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.trim().is_empty() {
            return Err(ReasoningError::InvalidResponse("Empty completion".into()));
        }

        tracing::trace!(response_len = text.len(), "Reasoning completion received");
        Ok(text)
    }
}

/// Process-scoped reasoning capability
///
/// Built once at startup and injected into the scorer and persona generator.
/// The disabled variant makes every call fail fast with
/// `ReasoningError::Disabled`, which callers treat as "use the fallback".
#[derive(Clone)]
pub struct ReasoningProvider {
    service: Option<Arc<dyn ReasoningService>>,
    timeout: Duration,
}

impl ReasoningProvider {
    pub fn new(service: Arc<dyn ReasoningService>, timeout: Duration) -> Self {
        Self {
            service: Some(service),
            timeout,
        }
    }

    pub fn disabled() -> Self {
        Self {
            service: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.service.is_some()
    }

    /// Run one completion bounded by the configured timeout
    pub async fn complete(&self, system: &str, prompt: &str) -> Result<String, ReasoningError> {
        let service = self.service.as_ref().ok_or(ReasoningError::Disabled)?;

        tokio::time::timeout(self.timeout, service.complete(system, prompt))
            .await
            .map_err(|_| ReasoningError::Timeout(self.timeout))?
    }
}

impl std::fmt::Debug for ReasoningProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReasoningProvider")
            .field("enabled", &self.is_enabled())
            .field("timeout", &self.timeout)
            .finish()
    }
}
