use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use crate::config::Config;
use super::{http_client, send_json, LlmError, Provider, ProviderKind};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Messages API client.
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    max_tokens: u32,
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

impl AnthropicProvider {
    pub fn new(api_key: String, config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client(config)?,
            api_key,
            model: config.model(ProviderKind::Anthropic).to_string(),
            endpoint: config.endpoint(ProviderKind::Anthropic).to_string(),
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
        })
    }
}

pub(crate) fn request_body(model: &str, max_tokens: u32, prompt: &str) -> Value {
    json!({
        "model": model,
        "max_tokens": max_tokens,
        "messages": [
            { "role": "user", "content": [{ "type": "text", "text": prompt }] }
        ],
    })
}

/// First text block wins; tool-use and other blocks are skipped.
pub(crate) fn extract_text(response: MessageResponse) -> Result<String, LlmError> {
    if response.content.is_empty() {
        return Err(LlmError::NoSuggestions);
    }
    response
        .content
        .into_iter()
        .find(|block| block.block_type == "text")
        .and_then(|block| block.text)
        .map(|text| text.trim().to_string())
        .ok_or(LlmError::NoTextContent)
}

impl Provider for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = self
            .client
            .post(format!("{}/messages", self.endpoint))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body(&self.model, self.max_tokens, prompt));
        extract_text(send_json(request, self.timeout_secs)?)
    }
}
