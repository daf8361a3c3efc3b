use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerBody {
    /// Falls back to the server's `--tenant` when omitted.
    #[serde(default)]
    pub tenant_id: Option<String>,
    pub utterance: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub max_rounds: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub kind: String,
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EntityInfo {
    pub entity: String,
    pub operation: String,
    pub fallback: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EntitiesResponse {
    pub entities: Vec<EntityInfo>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub transport: String,
    pub available_sessions: usize,
    pub max_sessions: usize,
}
