use super::docs::ApiDoc;
use super::error::ServerError;
use super::routes;
use super::state::ServerState;
use crate::agent::Orchestrator;
use axum::http::Method;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use utoipa::OpenApi;

pub(super) fn build(orchestrator: Arc<Orchestrator>, default_tenant: Option<String>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let state = Arc::new(ServerState::new(orchestrator, default_tenant));
    Router::new()
        .route("/answer", post(routes::answer::answer_handler))
        .route("/entities", get(routes::entities::entities_handler))
        .route("/health", get(routes::health::health_handler))
        .route(
            "/api-doc/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(cors)
        .with_state(state)
}

pub(super) async fn serve(
    orchestrator: Arc<Orchestrator>,
    default_tenant: Option<String>,
    addr: SocketAddr,
) -> Result<(), ServerError> {
    info!(%addr, "Binding REST server");
    let app = build(orchestrator, default_tenant);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "REST server ready to accept connections");

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(ServerError::Serve)
}
