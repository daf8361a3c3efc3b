use super::super::dto::{AnswerBody, ErrorResponse};
use super::super::error::ApiError;
use super::super::state::ServerState;
use crate::agent::{AgentOutcome, AnswerRequest};
use axum::Json;
use axum::extract::State;
use std::sync::Arc;
use tracing::{error, info};

#[utoipa::path(
    post,
    path = "/answer",
    tag = "answer",
    request_body = AnswerBody,
    responses(
        (status = 200, description = "Question answered, possibly partially", body = AgentOutcome),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 422, description = "Question could not be mapped to business data", body = ErrorResponse),
        (status = 502, description = "Tool server or model unreachable", body = ErrorResponse),
        (status = 504, description = "Request deadline exceeded", body = ErrorResponse)
    )
)]
pub async fn answer_handler(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<AnswerBody>,
) -> Result<Json<AgentOutcome>, ApiError> {
    let AnswerBody {
        tenant_id,
        utterance,
        conversation_id,
        max_rounds,
    } = payload;

    let Some(tenant_id) = tenant_id.or_else(|| state.default_tenant().map(str::to_string)) else {
        error!("Rejecting /answer request without tenant");
        return Err(ApiError::bad_request("tenant_id is required"));
    };
    info!(
        tenant_id = tenant_id.as_str(),
        conversation = conversation_id.as_deref(),
        "Received /answer request"
    );

    let request = AnswerRequest {
        tenant_id,
        utterance,
        conversation_id,
        max_rounds,
    };
    match state.orchestrator().answer_with(request).await {
        Ok(outcome) => {
            info!(rounds = outcome.rounds, complete = outcome.complete, "/answer completed");
            Ok(Json(outcome))
        }
        Err(err) => {
            error!(kind = err.kind(), %err, "/answer failed");
            Err(err.into())
        }
    }
}
