use super::defaults::{DEFAULT_MODEL, DEFAULT_PROMPT_TEMPLATE};
use super::entity::EntityConfig;
use super::error::ConfigError;
use super::policy::PolicyConfig;
use super::provider::ProviderConfig;
use super::transport::TransportConfig;
use std::path::Path;

/// Application configuration loaded from agent.toml
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: String,
    pub system_prompt: Option<String>,
    pub prompt_template: String,
    pub provider: ProviderConfig,
    pub transport: Option<TransportConfig>,
    pub policy: PolicyConfig,
    pub entities: Vec<EntityConfig>,
}

impl AppConfig {
    /// Load configuration from a file path (or default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        super::loader::parse_config(content, origin)
    }

    pub fn prompt_template(&self) -> &str {
        &self.prompt_template
    }

    pub fn require_transport(&self) -> Result<&TransportConfig, ConfigError> {
        self.transport.as_ref().ok_or(ConfigError::MissingTransport)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            provider: ProviderConfig::default(),
            transport: None,
            policy: PolicyConfig::default(),
            entities: Vec::new(),
        }
    }
}
