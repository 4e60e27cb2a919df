use serde::{Deserialize, Serialize};
use crate::llm::LlmError;

/// A command proposed by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Suggestion {
    /// Parses a model reply.
    ///
    /// Accepts the requested `{"command": ..., "description": ...}` object,
    /// the same object wrapped in a markdown fence or surrounded by chatter,
    /// and falls back to treating the whole reply as the command. A reply
    /// that leaves nothing to run is [`LlmError::NoSuggestions`].
    pub fn parse(reply: &str) -> Result<Suggestion, LlmError> {
        let reply = strip_fence(reply.trim());
        let suggestion = parse_json(reply)
            .or_else(|| {
                let (start, end) = (reply.find('{')?, reply.rfind('}')?);
                (start < end).then(|| parse_json(&reply[start..=end])).flatten()
            })
            .unwrap_or_else(|| Suggestion {
                command: reply.trim_matches('`').trim().to_string(),
                description: None,
            });
        if suggestion.command.is_empty() {
            return Err(LlmError::NoSuggestions);
        }
        Ok(suggestion)
    }
}

fn parse_json(text: &str) -> Option<Suggestion> {
    let mut suggestion: Suggestion = serde_json::from_str(text).ok()?;
    suggestion.command = suggestion.command.trim().to_string();
    suggestion.description = suggestion
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    Some(suggestion)
}

fn strip_fence(text: &str) -> &str {
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (`json`, `sh`, ...) on the opening line.
    let body = match body.find('\n') {
        Some(newline) => &body[newline + 1..],
        None => body,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}
