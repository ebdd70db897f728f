#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{net::SocketAddr, time::Duration};

use anyhow::{Context, Result};
use bon::Builder;

/// Chat-completion endpoint used when `OPENROUTER_ENDPOINT` is unset.
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Model identifier used when `OPENROUTER_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-maverick:free";

/// Attribution referer sent to the provider.
pub const DEFAULT_REFERER: &str = "https://localhost:5001";

/// Attribution title sent to the provider.
pub const DEFAULT_TITLE: &str = "Code Evaluation Tool";

/// Sampling temperature for reviews; kept low so grades stay stable.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Token cap for a single review.
pub const DEFAULT_MAX_TOKENS: u32 = 1500;

/// Timeout for the outbound provider call, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Port used when neither `--port` nor `PORT` is given.
pub const DEFAULT_PORT: u16 = 8000;

/// Origins allowed to call `/evaluate` when `CODEARENA_ALLOWED_ORIGINS` is
/// unset.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Credentials and tuning parameters for the review provider.
#[derive(Clone, Builder)]
#[builder(on(String, into))]
pub struct ProviderConfig {
    /// Fully qualified chat-completion endpoint.
    #[builder(default = DEFAULT_ENDPOINT.to_string())]
    endpoint:    String,
    /// Bearer token used to authenticate requests.
    api_key:     String,
    /// Model identifier for chat completions.
    #[builder(default = DEFAULT_MODEL.to_string())]
    model:       String,
    /// Value of the `HTTP-Referer` attribution header.
    #[builder(default = DEFAULT_REFERER.to_string())]
    referer:     String,
    /// Value of the `X-Title` attribution header.
    #[builder(default = DEFAULT_TITLE.to_string())]
    title:       String,
    /// Sampling temperature.
    #[builder(default = DEFAULT_TEMPERATURE)]
    temperature: f32,
    /// Maximum number of tokens in a review.
    #[builder(default = DEFAULT_MAX_TOKENS)]
    max_tokens:  u32,
    /// Upper bound on the whole outbound call.
    #[builder(default = Duration::from_secs(DEFAULT_TIMEOUT_SECS))]
    timeout:     Duration,
}

impl ProviderConfig {
    /// Reads the provider configuration from the environment.
    ///
    /// `OPENROUTER_API_KEY` is required; every other value falls back to its
    /// default when missing or blank.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .ok()
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty())
            .context("OPENROUTER_API_KEY must be set to call the review provider")?;

        Ok(Self::builder()
            .api_key(api_key)
            .endpoint(read_string("OPENROUTER_ENDPOINT", DEFAULT_ENDPOINT))
            .model(read_string("OPENROUTER_MODEL", DEFAULT_MODEL))
            .referer(read_string("OPENROUTER_REFERER", DEFAULT_REFERER))
            .title(read_string("OPENROUTER_TITLE", DEFAULT_TITLE))
            .timeout(read_timeout_secs("OPENROUTER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS))
            .build())
    }

    /// Returns the chat-completion endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the attribution referer.
    pub fn referer(&self) -> &str {
        &self.referer
    }

    /// Returns the attribution title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the sampling temperature.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Returns the token cap.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Returns the outbound call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// The key must never end up in logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("referer", &self.referer)
            .field("title", &self.title)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Where the HTTP surface listens and who may call it.
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct ServerConfig {
    /// Interface to bind.
    #[builder(default = "0.0.0.0".to_string())]
    host:            String,
    /// Port to bind.
    #[builder(default = DEFAULT_PORT)]
    port:            u16,
    /// Origins allowed by the CORS policy on `/evaluate`.
    #[builder(default = DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect())]
    allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Builds the server configuration for the given bind address, reading the
    /// CORS origins from `CODEARENA_ALLOWED_ORIGINS` (comma separated).
    pub fn from_env(host: String, port: u16) -> Self {
        let origins = std::env::var("CODEARENA_ALLOWED_ORIGINS")
            .ok()
            .map(|value| parse_origins(&value))
            .filter(|origins| !origins.is_empty());

        Self::builder()
            .host(host)
            .port(port)
            .maybe_allowed_origins(origins)
            .build()
    }

    /// Returns the interface to bind.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port to bind.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the allowed CORS origins.
    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    /// Resolves host and port into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}

/// Splits a comma separated origin list, dropping blanks.
fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Reads a trimmed environment variable, falling back to `default` when it is
/// missing or blank.
fn read_string(env: &str, default: &str) -> String {
    std::env::var(env)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parses an environment variable into a `Duration`, falling back to
/// `default_secs` when parsing fails or the variable is missing.
fn read_timeout_secs(env: &str, default_secs: u64) -> Duration {
    std::env::var(env)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_defaults_match_review_settings() {
        let cfg = ProviderConfig::builder().api_key("sk-test").build();

        assert_eq!(cfg.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(cfg.model(), DEFAULT_MODEL);
        assert_eq!(cfg.max_tokens(), 1500);
        assert!((cfg.temperature() - 0.1).abs() < f32::EPSILON);
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let cfg = ProviderConfig::builder().api_key("sk-secret").build();
        let printed = format!("{cfg:?}");

        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins(" https://a.example , ,https://b.example"),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn server_defaults_bind_all_interfaces() {
        let cfg = ServerConfig::builder().build();

        assert_eq!(cfg.socket_addr().expect("addr").to_string(), "0.0.0.0:8000");
        assert_eq!(cfg.allowed_origins().len(), 2);
    }
}
