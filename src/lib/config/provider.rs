//! # Provider Configuration
//!
//! Completion engine settings.
//!
//! | Kind | Description | API Key Required |
//! |------|-------------|-----------------|
//! | `ollama` | Local Ollama server (`/api/chat`) | No |
//! | `openai` | OpenAI-compatible chat completions | Yes |
//!
//! ```toml
//! [provider]
//! kind = "openai"
//! endpoint = "https://api.openai.com"
//! api_key_env = "OPENAI_API_KEY"
//! ```

use super::defaults::{DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OPENAI_API_PATH, DEFAULT_OPENAI_ENDPOINT};
use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Ollama,
    OpenAi,
}

impl ProviderKind {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "ollama" => Ok(Self::Ollama),
            "openai" | "open_ai" | "openai-compatible" => Ok(Self::OpenAi),
            other => Err(ConfigError::UnknownProviderKind {
                kind: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub endpoint: String,
    /// Resolved secret; never serialized back out.
    pub api_key: Option<String>,
    pub api_path: Option<String>,
}

impl ProviderConfig {
    pub fn ollama(endpoint: impl Into<String>) -> Self {
        Self {
            kind: ProviderKind::Ollama,
            endpoint: endpoint.into(),
            api_key: None,
            api_path: None,
        }
    }

    pub fn is_ollama(&self) -> bool {
        self.kind == ProviderKind::Ollama
    }

    pub fn chat_path(&self) -> &str {
        match (self.kind, self.api_path.as_deref()) {
            (_, Some(path)) => path,
            (ProviderKind::Ollama, None) => "api/chat",
            (ProviderKind::OpenAi, None) => DEFAULT_OPENAI_API_PATH,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::ollama(DEFAULT_OLLAMA_ENDPOINT)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(super) struct RawProviderConfig {
    #[serde(default)]
    kind: String,
    endpoint: Option<String>,
    api_key: Option<String>,
    api_key_env: Option<String>,
    api_path: Option<String>,
}

impl RawProviderConfig {
    pub(super) fn build(self) -> Result<ProviderConfig, ConfigError> {
        let kind = ProviderKind::parse(&self.kind)?;
        let endpoint = self.endpoint.unwrap_or_else(|| match kind {
            ProviderKind::Ollama => DEFAULT_OLLAMA_ENDPOINT.to_string(),
            ProviderKind::OpenAi => DEFAULT_OPENAI_ENDPOINT.to_string(),
        });
        let api_key = self
            .api_key
            .map(|key| super::transport::expand(&key))
            .or_else(|| self.api_key_env.and_then(|name| env::var(name).ok()))
            .filter(|key| !key.trim().is_empty());
        Ok(ProviderConfig {
            kind,
            endpoint,
            api_key,
            api_path: self.api_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_defaults_to_ollama() {
        let config = RawProviderConfig::default().build().expect("valid");
        assert!(config.is_ollama());
        assert_eq!(config.endpoint, DEFAULT_OLLAMA_ENDPOINT);
        assert_eq!(config.chat_path(), "api/chat");
    }

    #[test]
    fn openai_uses_completions_path() {
        let raw = RawProviderConfig {
            kind: "OpenAI".into(),
            ..Default::default()
        };
        let config = raw.build().expect("valid");
        assert_eq!(config.kind, ProviderKind::OpenAi);
        assert_eq!(config.chat_path(), "v1/chat/completions");
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let raw = RawProviderConfig {
            kind: "gemini".into(),
            ..Default::default()
        };
        assert!(matches!(
            raw.build(),
            Err(ConfigError::UnknownProviderKind { .. })
        ));
    }
}
