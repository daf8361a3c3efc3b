use super::super::dto::HealthResponse;
use super::super::state::ServerState;
use axum::Json;
use axum::extract::State;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn health_handler(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    let pool = state.orchestrator().pool();
    Json(HealthResponse {
        status: "ok".into(),
        transport: pool.transport().name().to_string(),
        available_sessions: pool.available(),
        max_sessions: pool.capacity(),
    })
}
