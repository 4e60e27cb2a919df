//! Error types for provider calls.

use thiserror::Error;

/// Errors that can occur while asking a provider for a suggestion.
#[derive(Debug, Error)]
pub enum LlmError {
    /// None of the supported API key variables is set.
    #[error("no API key found. Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or GEMINI_API_KEY")]
    NoApiKey,

    /// A specific provider was requested but its key is missing.
    #[error("API key not found for {provider}. Set {env_var} environment variable.")]
    ApiKeyMissing { provider: String, env_var: String },

    /// Unknown provider name.
    #[error("unsupported provider: {0} (expected gemini, openai or anthropic)")]
    UnsupportedProvider(String),

    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timeout.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limit exceeded, try again later")]
    RateLimited,

    /// Failed to parse API response.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The response held no candidates, choices or content blocks.
    #[error("no suggestions received")]
    NoSuggestions,

    /// Content blocks were present but none of them was text.
    #[error("no text content found")]
    NoTextContent,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LlmError::Parse(err.to_string())
        } else {
            LlmError::Http(err.to_string())
        }
    }
}
