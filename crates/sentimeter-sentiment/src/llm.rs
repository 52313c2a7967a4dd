//! Minimal client for OpenAI-compatible chat completions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::retry::retry_with_backoff;

const SERVICE: &str = "chat completions";

/// Transport settings shared by every model client.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl HttpSettings {
    pub(crate) fn build_client(&self) -> Result<reqwest::Client, SentimentError> {
        Ok(reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&self.user_agent)
            .build()?)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_owned(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completions client (Groq or any OpenAI-compatible server).
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl ChatClient {
    /// # Errors
    ///
    /// Returns [`SentimentError::MissingApiKey`] if `api_key` is blank, or
    /// [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        api_key: &str,
        settings: &HttpSettings,
    ) -> Result<Self, SentimentError> {
        if api_key.trim().is_empty() {
            return Err(SentimentError::MissingApiKey("GROQ_API_KEY"));
        }
        Ok(Self {
            client: settings.build_client()?,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.trim().to_owned(),
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
        })
    }

    /// Send one chat request and return the first choice's trimmed content.
    ///
    /// # Errors
    ///
    /// - [`SentimentError::RateLimited`] / [`SentimentError::UnexpectedStatus`]
    ///   after retries are exhausted (4xx other than 429 fail immediately).
    /// - [`SentimentError::Deserialize`] if the body is not a completion.
    /// - [`SentimentError::EmptyCompletion`] if no choice carries content.
    pub async fn complete(&self, request: &ChatRequest) -> Result<String, SentimentError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(request)
                .send()
                .await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(SentimentError::RateLimited {
                    service: SERVICE,
                    retry_after_secs,
                });
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SentimentError::UnexpectedStatus {
                    service: SERVICE,
                    status: status.as_u16(),
                    body: body.chars().take(200).collect(),
                });
            }

            let body = response.text().await?;
            let parsed: ChatResponse =
                serde_json::from_str(&body).map_err(|e| SentimentError::Deserialize {
                    context: format!("{SERVICE} response from {}", request.model),
                    source: e,
                })?;

            parsed
                .choices
                .into_iter()
                .find_map(|c| c.message.content)
                .map(|c| c.trim().to_owned())
                .filter(|c| !c.is_empty())
                .ok_or_else(|| SentimentError::EmptyCompletion {
                    model: request.model.clone(),
                })
        })
        .await
    }
}
