//! Grok chat-completion client.
//!
//! Posts persona prompts to an xAI-compatible chat-completion endpoint and
//! classifies failures for the retry driver: rate limits and server errors
//! are transient, other HTTP errors and malformed bodies are permanent.

use crate::backend::{GenerationOptions, TextBackend, generate_with_retry};
use crate::config::{BackendConfig, RetryConfig};
use crate::error::BackendError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_URL: &str = "https://api.x.ai/v1/chat/completions";

/// Client for a Grok-style chat-completion backend.
pub struct GrokClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    timeout_secs: u64,
    retry: RetryConfig,
}

impl GrokClient {
    /// Create a client from configuration.
    ///
    /// Reads the bearer token from the environment variable named in
    /// `config.api_key_env`; a missing credential is an error so the engine
    /// can fall back to placeholder responses instead of issuing
    /// unauthenticated calls.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            BackendError::MissingCredential {
                var: config.api_key_env.clone(),
            }
        })?;
        Self::new_with_key(config, api_key)
    }

    /// Create a client with an explicitly provided API key.
    pub fn new_with_key(config: &BackendConfig, api_key: String) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Connection {
                message: format!("failed to construct HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
            retry: config.retry.clone(),
        })
    }

    /// Generate text for a prompt, retrying transient failures.
    ///
    /// Never returns an error for backend failures: every failure mode
    /// resolves to a `[Backend Error]:`-prefixed sentinel string.
    pub async fn generate_text(&self, prompt: &str, options: &GenerationOptions) -> String {
        generate_with_retry(self, prompt, options, &self.retry).await
    }

    /// Build the chat-completion request body.
    fn build_payload(&self, prompt: &str, options: &GenerationOptions) -> Value {
        json!({
            "model": options.model.as_deref().unwrap_or(&self.model),
            "messages": [{"role": "user", "content": prompt}],
            "temperature": options.temperature.unwrap_or(self.temperature),
            "max_tokens": options.max_tokens.unwrap_or(self.max_tokens),
        })
    }

    /// Map a non-success HTTP status to the appropriate `BackendError`.
    fn map_http_error(status: reqwest::StatusCode, body_text: &str) -> BackendError {
        match status.as_u16() {
            429 => BackendError::RateLimited,
            s if s >= 500 => BackendError::Server { status: s },
            s => BackendError::Http {
                status: s,
                message: body_text.chars().take(200).collect(),
            },
        }
    }

    /// Extract `choices[0].message.content` from a success body.
    fn parse_response(body: &Value) -> Result<String, BackendError> {
        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(|text| text.to_string())
            .ok_or_else(|| BackendError::MalformedResponse {
                message: "missing choices[0].message.content".to_string(),
            })
    }
}

#[async_trait]
impl TextBackend for GrokClient {
    async fn complete(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, BackendError> {
        let payload = self.build_payload(prompt, options);
        debug!(url = %self.api_url, model = %payload["model"], "Sending completion request");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    BackendError::Connection {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let body_text = response.text().await.map_err(|e| BackendError::Connection {
            message: format!("failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, &body_text));
        }

        let body: Value =
            serde_json::from_str(&body_text).map_err(|e| BackendError::MalformedResponse {
                message: format!("response is not JSON: {}", e),
            })?;
        Self::parse_response(&body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
