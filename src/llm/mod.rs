//! Provider clients that turn a task description into a shell command.
//!
//! Three HTTP APIs are supported: Gemini, OpenAI and Anthropic. Keys are
//! read from `GEMINI_API_KEY`, `OPENAI_API_KEY` and `ANTHROPIC_API_KEY`;
//! when no provider is requested explicitly the first one with a key wins,
//! in that order.

pub mod anthropic;
pub mod error;
pub mod gemini;
pub mod openai;
pub mod prompt;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};
use crate::config::Config;

pub use anthropic::AnthropicProvider;
pub use error::LlmError;
pub use gemini::GeminiProvider;
pub use openai::OpenaiProvider;
pub use prompt::{build_prompt, build_prompt_with_context};

/// Supported providers, in default lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Openai,
    Anthropic,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::Gemini, ProviderKind::Openai, ProviderKind::Anthropic];

    pub fn api_key_env_var(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::Openai => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Openai => "openai",
            ProviderKind::Anthropic => "anthropic",
        };
        f.write_str(name)
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::Openai),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            other => Err(LlmError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// A chat model that answers a single prompt.
pub trait Provider {
    fn kind(&self) -> ProviderKind;

    /// Sends `prompt` and returns the trimmed text of the first answer.
    fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    fn generate_command(&self, description: &str) -> Result<String, LlmError> {
        self.complete(&build_prompt(description))
    }

    fn generate_command_with_context(
        &self,
        description: &str,
        error_context: &str,
    ) -> Result<String, LlmError> {
        self.complete(&build_prompt_with_context(description, error_context))
    }
}

/// Picks a provider using the process environment for API keys.
pub fn select_provider(
    config: &Config,
    requested: Option<ProviderKind>,
) -> Result<Box<dyn Provider>, LlmError> {
    select_provider_with(config, requested, |var| std::env::var(var).ok())
}

/// Picks a provider, looking keys up through `lookup`.
///
/// `requested` beats `config.provider`; either one must have its key set.
/// Without a preference the first kind in [`ProviderKind::ALL`] with a
/// non-empty key is used.
pub fn select_provider_with<F>(
    config: &Config,
    requested: Option<ProviderKind>,
    lookup: F,
) -> Result<Box<dyn Provider>, LlmError>
where
    F: Fn(&str) -> Option<String>,
{
    let key_for = |kind: ProviderKind| lookup(kind.api_key_env_var()).filter(|key| !key.is_empty());

    let (kind, key) = match requested.or(config.provider) {
        Some(kind) => {
            let key = key_for(kind).ok_or_else(|| LlmError::ApiKeyMissing {
                provider: kind.to_string(),
                env_var: kind.api_key_env_var().to_string(),
            })?;
            (kind, key)
        }
        None => ProviderKind::ALL
            .into_iter()
            .find_map(|kind| key_for(kind).map(|key| (kind, key)))
            .ok_or(LlmError::NoApiKey)?,
    };

    info!(provider = %kind, model = config.model(kind), "selected provider");
    let provider: Box<dyn Provider> = match kind {
        ProviderKind::Gemini => Box::new(GeminiProvider::new(key, config)?),
        ProviderKind::Openai => Box::new(OpenaiProvider::new(key, config)?),
        ProviderKind::Anthropic => Box::new(AnthropicProvider::new(key, config)?),
    };
    Ok(provider)
}

pub(crate) fn http_client(config: &Config) -> Result<Client, LlmError> {
    Client::builder()
        .user_agent(concat!("suggest/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(LlmError::from)
}

/// Sends a request and decodes a successful JSON body into `T`.
pub(crate) fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    timeout_secs: u64,
) -> Result<T, LlmError> {
    let response = request.send().map_err(|e| {
        if e.is_timeout() {
            LlmError::Timeout { timeout_secs }
        } else {
            LlmError::from(e)
        }
    })?;
    let status = response.status();
    let body = response.text()?;
    debug!(status = status.as_u16(), bytes = body.len(), "provider response");
    classify(status, &body)
}

/// Maps a provider response onto the decoded body or an [`LlmError`].
pub(crate) fn classify<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, LlmError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(LlmError::RateLimited);
    }
    if !status.is_success() {
        return Err(LlmError::Api {
            status: status.as_u16(),
            message: error_message(body).unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            }),
        });
    }
    serde_json::from_str(body).map_err(|e| LlmError::Parse(e.to_string()))
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// All three providers nest the message under `error.message`.
pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
}
