use crate::application::tooling::ResultShape;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// One tool call made while answering.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AgentStep {
    pub round: usize,
    pub entity: String,
    pub instruction: String,
    pub operation: String,
    pub used_fallback: bool,
    pub shape: ResultShape,
    #[schema(value_type = Object)]
    pub arguments: Value,
    pub digest: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AgentOutcome {
    pub answer: String,
    /// `false` when the round cap cut the loop short.
    pub complete: bool,
    pub rounds: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub steps: Vec<AgentStep>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnswerRequest {
    pub tenant_id: String,
    pub utterance: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub max_rounds: Option<usize>,
}

impl AnswerRequest {
    pub fn new(tenant_id: impl Into<String>, utterance: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            utterance: utterance.into(),
            conversation_id: None,
            max_rounds: None,
        }
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }
}
