//! Model traits

use super::types::{ModelError, ModelRequest, ModelResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for model provider implementations
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Short identifier used in logs and error messages
    fn id(&self) -> &str;

    /// Send a chat request to the model provider
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;
}

#[async_trait]
impl<T: ModelProvider + ?Sized> ModelProvider for Arc<T> {
    fn id(&self) -> &str {
        (**self).id()
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        (**self).chat(request).await
    }
}
