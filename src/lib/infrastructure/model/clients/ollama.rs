//! Ollama client implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::config::ProviderConfig;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::traits::ModelProvider;
use crate::infrastructure::model::types::{ModelError, ModelRequest, ModelResponse};

/// Ollama client for local LLM
#[derive(Clone)]
pub struct OllamaClient {
    base: HttpClientBase,
    path: String,
}

impl OllamaClient {
    /// Creates client from provider config.
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            base: HttpClientBase::new("ollama", config.endpoint.clone(), None),
            path: config.chat_path().to_string(),
        }
    }
}

#[async_trait]
impl ModelProvider for OllamaClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let url = self.base.build_url(&self.path);

        let payload = OllamaRequest {
            model: request.model.clone(),
            messages: MessageAdapter::to_ollama_format(&request.messages),
            stream: false,
            format: None,
        };

        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            messages = request.messages.len(),
            "Sending request to Ollama"
        );

        let response: OllamaResponse = self.base.post_no_auth(&url, &payload).await?;
        debug!("Received response from Ollama");

        let content = response
            .message
            .ok_or_else(|| ModelError::invalid_response(&self.base.id, "missing message"))?
            .content;

        Ok(ModelResponse::new(content))
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<serde_json::Value>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: Option<OllamaMessage>,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}
