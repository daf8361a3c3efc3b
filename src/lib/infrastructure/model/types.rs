//! Model types - Request, Response, and Error types

use crate::types::{ChatMessage, MessageRole};
use reqwest::StatusCode;
use thiserror::Error;

/// Model request for LLM chat
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// Model response from LLM
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub message: ChatMessage,
}

impl ModelResponse {
    pub fn new(content: String) -> Self {
        Self {
            message: ChatMessage::new(MessageRole::Assistant, content),
        }
    }
}

/// Model errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("provider '{provider}' requires an API key")]
    MissingApiKey { provider: String },
    #[error("network error calling provider '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider '{provider}' returned invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

impl ModelError {
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source,
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ModelError::MissingApiKey { provider } => {
                format!("The language model '{provider}' needs an API key that is not configured.")
            }
            ModelError::Network { provider, source } => {
                if source.is_connect() {
                    format!("Could not connect to the language model '{provider}'.")
                } else if source.is_timeout() {
                    format!("The language model '{provider}' took too long to answer.")
                } else if let Some(status) = source.status() {
                    match status {
                        StatusCode::NOT_FOUND => {
                            format!("The language model endpoint for '{provider}' was not found.")
                        }
                        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                            format!("The language model '{provider}' is currently unavailable.")
                        }
                        _ => format!(
                            "The language model '{provider}' rejected the request ({}).",
                            status.as_u16()
                        ),
                    }
                } else {
                    format!("Network error while talking to the language model '{provider}'.")
                }
            }
            ModelError::InvalidResponse { provider, .. } => {
                format!("The language model '{provider}' sent a response that could not be read.")
            }
        }
    }
}
