mod docs;
mod dto;
mod error;
mod router;
mod routes;
mod state;

pub use dto::{AnswerBody, EntitiesResponse, EntityInfo, ErrorResponse, HealthResponse};
pub use error::{ApiError, ServerError};
pub(crate) use state::ServerState;

use crate::agent::Orchestrator;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;

pub fn router(orchestrator: Arc<Orchestrator>, default_tenant: Option<String>) -> Router {
    router::build(orchestrator, default_tenant)
}

pub async fn serve(
    orchestrator: Arc<Orchestrator>,
    default_tenant: Option<String>,
    addr: SocketAddr,
) -> Result<(), ServerError> {
    router::serve(orchestrator, default_tenant, addr).await
}

#[cfg(test)]
mod tests;
