use crate::config::AppConfig;
use crate::model::{ModelError, ModelProvider, ModelRequest};
use crate::types::{ChatMessage, MessageRole};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub model: String,
    pub custom_instruction: Option<String>,
    pub prompt_template: Option<String>,
}

impl ClientConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            custom_instruction: None,
            prompt_template: None,
        }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(config.model.clone())
            .with_prompt_template(Some(config.prompt_template.clone()))
            .with_custom_instruction(config.system_prompt.clone())
    }

    pub fn with_custom_instruction(mut self, instruction: Option<String>) -> Self {
        self.custom_instruction = instruction;
        self
    }

    pub fn with_prompt_template(mut self, template: Option<String>) -> Self {
        self.prompt_template = template;
        self
    }
}

/// One completion call: system prompt, prior turns, new user prompt.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub system_prompt: Option<String>,
    pub history: Vec<ChatMessage>,
    pub prompt: String,
}

/// Thin wrapper over a [`ModelProvider`] that owns prompt composition.
pub struct CompletionClient {
    provider: Arc<dyn ModelProvider>,
    config: ClientConfig,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn ModelProvider>, config: ClientConfig) -> Self {
        Self { provider, config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn provider_id(&self) -> &str {
        self.provider.id()
    }

    pub async fn complete(&self, request: CompletionRequest) -> Result<String, ModelError> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        if let Some(system) = request.system_prompt.filter(|s| !s.trim().is_empty()) {
            messages.push(ChatMessage::new(MessageRole::System, system));
        }
        messages.extend(request.history);
        debug!(prompt = %summarise(&request.prompt), "Prepared completion prompt");
        messages.push(ChatMessage::new(MessageRole::User, request.prompt));

        info!(
            provider = self.provider.id(),
            model = self.config.model.as_str(),
            messages = messages.len(),
            "Sending request to model provider"
        );
        let response = self
            .provider
            .chat(ModelRequest {
                model: self.config.model.clone(),
                messages,
            })
            .await?;
        debug!(response = %summarise(&response.message.content), "Response received from model provider");
        Ok(response.message.content)
    }

    /// Fills the template's `{{custom_instruction}}`, `{{entity_guidance}}`
    /// and `{{protocol}}` placeholders and collapses repeated blank lines.
    pub fn compose_system_prompt(&self, entity_guidance: &str, protocol: &str) -> String {
        let custom_instruction = self.config.custom_instruction.clone().unwrap_or_default();
        let template = self.config.prompt_template.clone().unwrap_or_default();
        if template.trim().is_empty() {
            return [custom_instruction.trim(), entity_guidance.trim(), protocol.trim()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n");
        }

        let mut prompt = template
            .replace("{{custom_instruction}}", custom_instruction.trim())
            .replace("{{entity_guidance}}", entity_guidance.trim());
        if prompt.contains("{{protocol}}") {
            prompt = prompt.replace("{{protocol}}", protocol.trim());
        } else {
            prompt.push_str("\n\n");
            prompt.push_str(protocol.trim());
        }

        let mut cleaned = Vec::new();
        let mut previous_blank = false;
        for line in prompt.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if !previous_blank {
                    cleaned.push(String::new());
                }
                previous_blank = true;
            } else {
                cleaned.push(trimmed.to_string());
                previous_blank = false;
            }
        }
        cleaned.join("\n").trim().to_string()
    }
}

/// Single-line preview for logs.
pub(crate) fn summarise(text: &str) -> String {
    const SNIPPET_LIMIT: usize = 160;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "(empty)".to_string();
    }
    let single_line = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = single_line.chars();
    let mut result: String = chars.by_ref().take(SNIPPET_LIMIT).collect();
    if chars.next().is_some() {
        result.push('…');
    }
    result
}
