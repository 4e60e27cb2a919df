use std::path::Path;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;
use crate::global::utils::get_global_config_file;
use crate::llm::ProviderKind;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini-2025-04-14";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1";

/// Contents of `config.toml`. Every field is optional in the file.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Preferred provider. When unset the first provider with an API key wins.
    pub provider: Option<ProviderKind>,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub models: Models,
    pub endpoints: Endpoints,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Models {
    pub gemini: String,
    pub openai: String,
    pub anthropic: String,
}

/// API base URLs, without a trailing slash.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Endpoints {
    pub gemini: String,
    pub openai: String,
    pub anthropic: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: None,
            timeout_secs: 30,
            max_tokens: 100,
            models: Models::default(),
            endpoints: Endpoints::default(),
        }
    }
}

impl Default for Models {
    fn default() -> Self {
        Self {
            gemini: DEFAULT_GEMINI_MODEL.to_string(),
            openai: DEFAULT_OPENAI_MODEL.to_string(),
            anthropic: DEFAULT_ANTHROPIC_MODEL.to_string(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            gemini: DEFAULT_GEMINI_ENDPOINT.to_string(),
            openai: DEFAULT_OPENAI_ENDPOINT.to_string(),
            anthropic: DEFAULT_ANTHROPIC_ENDPOINT.to_string(),
        }
    }
}

impl Config {
    /// Loads the per-user config file (or `SUGGEST_CONFIG`). A missing file
    /// means defaults.
    pub fn load() -> Result<Config> {
        Config::load_from(get_global_config_file()?)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn model(&self, kind: ProviderKind) -> &str {
        match kind {
            ProviderKind::Gemini => &self.models.gemini,
            ProviderKind::Openai => &self.models.openai,
            ProviderKind::Anthropic => &self.models.anthropic,
        }
    }

    pub fn endpoint(&self, kind: ProviderKind) -> &str {
        let endpoint = match kind {
            ProviderKind::Gemini => &self.endpoints.gemini,
            ProviderKind::Openai => &self.endpoints.openai,
            ProviderKind::Anthropic => &self.endpoints.anthropic,
        };
        endpoint.trim_end_matches('/')
    }
}
