use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use crate::config::Config;
use super::{http_client, send_json, LlmError, Provider, ProviderKind};

/// Chat Completions API client.
pub struct OpenaiProvider {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: Message,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Message {
    pub content: Option<String>,
}

impl OpenaiProvider {
    pub fn new(api_key: String, config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client(config)?,
            api_key,
            model: config.model(ProviderKind::Openai).to_string(),
            endpoint: config.endpoint(ProviderKind::Openai).to_string(),
            timeout_secs: config.timeout_secs,
        })
    }
}

pub(crate) fn request_body(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "user", "content": prompt }
        ],
    })
}

pub(crate) fn extract_text(response: ChatResponse) -> Result<String, LlmError> {
    let choice = response.choices.into_iter().next().ok_or(LlmError::NoSuggestions)?;
    Ok(choice.message.content.unwrap_or_default().trim().to_string())
}

impl Provider for OpenaiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Openai
    }

    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&request_body(&self.model, prompt));
        extract_text(send_json(request, self.timeout_secs)?)
    }
}
