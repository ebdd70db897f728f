#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Client for the OpenRouter-style chat-completion endpoint that writes the
//! reviews.

use anyhow::Context;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ProviderConfig;

/// One message of a chat-completion request.
#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    /// `system` or `user`.
    pub role:    &'static str,
    /// Message text.
    pub content: &'a str,
}

impl<'a> ChatMessage<'a> {
    /// A system message.
    pub fn system(content: &'a str) -> Self {
        Self {
            role: "system",
            content,
        }
    }

    /// A user message.
    pub fn user(content: &'a str) -> Self {
        Self {
            role: "user",
            content,
        }
    }
}

/// Body of the outbound chat-completion request.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    /// Model identifier.
    pub model:       &'a str,
    /// System message followed by the review prompt.
    pub messages:    Vec<ChatMessage<'a>>,
    /// Token cap for the review.
    pub max_tokens:  u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// The parts of a chat-completion response we read.
#[derive(Debug, Default, Deserialize)]
pub struct ChatCompletionResponse {
    /// Completions; absent or `null` when the provider reports an error
    /// instead.
    pub choices: Option<Vec<Choice>>,
}

/// A single completion.
#[derive(Debug, Default, Deserialize)]
pub struct Choice {
    /// The assistant message.
    #[serde(default)]
    pub message: ChoiceMessage,
}

/// Assistant message of a completion.
#[derive(Debug, Default, Deserialize)]
pub struct ChoiceMessage {
    /// Review text, when the provider produced any.
    #[serde(default)]
    pub content: Option<String>,
}

/// Ways a review request can fail.
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    /// The provider could not be reached, timed out, or the body could not be
    /// read.
    #[error("Failed to reach the review provider")]
    Transport(#[source] reqwest::Error),
    /// The provider answered with a non-success status.
    #[error("Review provider returned status {status}")]
    Status {
        /// HTTP status returned.
        status: StatusCode,
        /// The provider's own error message, if the body carried one.
        detail: Option<String>,
    },
    /// A success status whose body is not a chat completion.
    #[error("Review provider returned a body that is not a chat completion")]
    InvalidBody(#[source] serde_json::Error),
    /// A chat completion without any choices.
    #[error("No evaluation returned from API")]
    NoChoices {
        /// The full provider payload, kept for diagnostics.
        payload: Value,
    },
    /// The first choice carried no text.
    #[error("Review provider returned a choice without message content")]
    MissingContent,
}

/// Sends review prompts to the provider.
#[derive(Debug, Clone)]
pub struct ReviewClient {
    /// Pooled HTTP client; its timeout bounds the whole call.
    http:   Client,
    /// Immutable provider settings.
    config: ProviderConfig,
}

impl ReviewClient {
    /// Creates a client for the given provider settings.
    pub fn new(config: ProviderConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to construct provider HTTP client")?;

        Ok(Self { http, config })
    }

    /// Asks the provider to review `prompt` and returns the raw review text.
    ///
    /// The body is parsed before the status is checked so that provider error
    /// payloads reach the logs, and, for non-success statuses, the error.
    pub async fn review(&self, system: &str, prompt: &str) -> Result<String, ProviderError> {
        let request = ChatCompletionRequest {
            model:       self.config.model(),
            messages:    vec![ChatMessage::system(system), ChatMessage::user(prompt)],
            max_tokens:  self.config.max_tokens(),
            temperature: self.config.temperature(),
        };

        tracing::debug!(endpoint = self.config.endpoint(), "Sending review request");
        if let Ok(pretty) = serde_json::to_string_pretty(&request) {
            tracing::debug!("Payload: {pretty}");
        }

        let response = self
            .http
            .post(self.config.endpoint())
            .bearer_auth(self.config.api_key())
            .header("HTTP-Referer", self.config.referer())
            .header("X-Title", self.config.title())
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::Transport)?;

        let status = response.status();
        tracing::debug!(%status, "Review provider responded");
        let body = response.text().await.map_err(ProviderError::Transport)?;

        let payload = match serde_json::from_str::<Value>(&body) {
            Ok(payload) => {
                tracing::debug!("Response JSON: {payload:#}");
                Ok(payload)
            }
            Err(e) => {
                tracing::error!("Failed to parse JSON response: {e}");
                tracing::debug!("Response content: {body}");
                Err(e)
            }
        };

        if !status.is_success() {
            return Err(ProviderError::Status {
                status,
                detail: payload.ok().as_ref().and_then(provider_error_message),
            });
        }

        let payload = payload.map_err(ProviderError::InvalidBody)?;
        let completion = ChatCompletionResponse::deserialize(&payload)
            .map_err(ProviderError::InvalidBody)?;

        match completion.choices.into_iter().flatten().next() {
            Some(choice) => choice.message.content.ok_or(ProviderError::MissingContent),
            None => Err(ProviderError::NoChoices { payload }),
        }
    }
}

/// Extracts the provider's error message from an error payload such as
/// `{"error": {"message": "...", "code": 401}}`.
fn provider_error_message(payload: &Value) -> Option<String> {
    let error = payload.get("error")?;
    match error.get("message").and_then(Value::as_str) {
        Some(message) => Some(message.to_string()),
        None => Some(error.to_string()),
    }
}
