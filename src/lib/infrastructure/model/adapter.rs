//! Message adapters - convert between different API formats

use crate::types::ChatMessage;
use serde_json::{Value, json};

/// Adapter for converting messages to different API formats
pub struct MessageAdapter;

impl MessageAdapter {
    /// Convert messages to OpenAI-style format
    /// Returns: [{"role": "...", "content": "..."}]
    pub fn to_openai_format(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "content": msg.content.clone()
                })
            })
            .collect()
    }

    /// Ollama's `/api/chat` accepts the same shape.
    pub fn to_ollama_format(messages: &[ChatMessage]) -> Vec<Value> {
        Self::to_openai_format(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageRole;

    #[test]
    fn keeps_roles_and_order() {
        let messages = vec![
            ChatMessage::new(MessageRole::System, "rules"),
            ChatMessage::new(MessageRole::User, "hi"),
        ];
        let formatted = MessageAdapter::to_openai_format(&messages);
        assert_eq!(formatted[0], json!({"role": "system", "content": "rules"}));
        assert_eq!(formatted[1]["role"], "user");
    }
}
