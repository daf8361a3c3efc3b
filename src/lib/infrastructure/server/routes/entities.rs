use super::super::dto::{EntitiesResponse, EntityInfo};
use super::super::state::ServerState;
use axum::Json;
use axum::extract::State;
use std::sync::Arc;
use tracing::debug;

#[utoipa::path(
    get,
    path = "/entities",
    tag = "entities",
    responses(
        (status = 200, description = "Registered entities and their operations", body = EntitiesResponse)
    )
)]
pub async fn entities_handler(State(state): State<Arc<ServerState>>) -> Json<EntitiesResponse> {
    let entities: Vec<EntityInfo> = state
        .orchestrator()
        .registry()
        .iter()
        .map(|(entity, descriptor)| EntityInfo {
            entity: entity.to_string(),
            operation: descriptor.operation.clone(),
            fallback: descriptor.fallback.clone(),
        })
        .collect();
    debug!(count = entities.len(), "Serving /entities request");
    Json(EntitiesResponse { entities })
}
