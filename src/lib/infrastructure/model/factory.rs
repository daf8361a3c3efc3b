//! Provider factory - creates the configured client

use super::clients::{OllamaClient, OpenAiClient};
use super::traits::ModelProvider;
use crate::config::{ProviderConfig, ProviderKind};
use std::sync::Arc;
use tracing::{info, warn};

/// Factory for creating model clients from provider config.
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create(config: &ProviderConfig) -> Arc<dyn ModelProvider> {
        info!(kind = ?config.kind, endpoint = config.endpoint.as_str(), "Creating model provider");
        match config.kind {
            ProviderKind::Ollama => Arc::new(OllamaClient::from_config(config)),
            ProviderKind::OpenAi => {
                if config.api_key.is_none() {
                    warn!("OpenAI-compatible provider configured without an API key");
                }
                Arc::new(OpenAiClient::from_config(config))
            }
        }
    }
}
