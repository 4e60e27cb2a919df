use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use crate::config::Config;
use super::{http_client, send_json, LlmError, Provider, ProviderKind};

/// `generateContent` API client.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Part {
    pub text: Option<String>,
}

impl GeminiProvider {
    pub fn new(api_key: String, config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client(config)?,
            api_key,
            model: config.model(ProviderKind::Gemini).to_string(),
            endpoint: config.endpoint(ProviderKind::Gemini).to_string(),
            timeout_secs: config.timeout_secs,
        })
    }
}

pub(crate) fn request_body(prompt: &str) -> Value {
    json!({
        "contents": [
            { "parts": [{ "text": prompt }] }
        ],
    })
}

/// Text of the first part of the first candidate.
pub(crate) fn extract_text(response: GenerateResponse) -> Result<String, LlmError> {
    let part = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .ok_or(LlmError::NoSuggestions)?;
    part.text
        .map(|text| text.trim().to_string())
        .ok_or(LlmError::NoTextContent)
}

impl Provider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = self
            .client
            .post(format!("{}/models/{}:generateContent", self.endpoint, self.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body(prompt));
        extract_text(send_json(request, self.timeout_secs)?)
    }
}
