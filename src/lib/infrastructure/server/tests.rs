use super::docs::ApiDoc;
use super::dto::AnswerBody;
use super::routes::{answer, entities, health};
use super::state::ServerState;
use crate::agent::Orchestrator;
use crate::application::client::{ClientConfig, CompletionClient};
use crate::application::intent::FixedClock;
use crate::application::registry::ToolRegistry;
use crate::application::tooling::{RawToolResult, SessionPool, ToolInvokeError, ToolTransport};
use crate::model::{ModelError, ModelProvider, ModelRequest, ModelResponse};
use async_trait::async_trait;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde_json::{Value, json};
use std::sync::Arc;
use utoipa::OpenApi;

struct FixedProvider;

#[async_trait]
impl ModelProvider for FixedProvider {
    fn id(&self) -> &str {
        "fixed"
    }

    async fn chat(&self, _request: ModelRequest) -> Result<ModelResponse, ModelError> {
        Ok(ModelResponse::new(
            r#"{"action":"final","response":"You have 2 reviews."}"#.to_string(),
        ))
    }
}

struct ReviewsOnly;

#[async_trait]
impl ToolTransport for ReviewsOnly {
    fn name(&self) -> &str {
        "reviews-only"
    }

    async fn invoke(&self, operation: &str, _arguments: Value) -> Result<RawToolResult, ToolInvokeError> {
        match operation {
            "reviews.list" => Ok(RawToolResult::Structured(json!([{"id": 1}, {"id": 2}]))),
            other => Err(ToolInvokeError::NotFound {
                server: "reviews-only".into(),
                operation: other.into(),
            }),
        }
    }
}

fn state(default_tenant: Option<&str>) -> Arc<ServerState> {
    let client = Arc::new(CompletionClient::new(
        Arc::new(FixedProvider),
        ClientConfig::new("m"),
    ));
    let today = NaiveDate::from_ymd_opt(2024, 5, 1).expect("date");
    let orchestrator = Orchestrator::new(
        Arc::new(ToolRegistry::builtin()),
        SessionPool::new(Arc::new(ReviewsOnly), 3),
        client,
    )
    .with_clock(Arc::new(FixedClock(today)));
    Arc::new(ServerState::new(
        Arc::new(orchestrator),
        default_tenant.map(str::to_string),
    ))
}

fn body(tenant: Option<&str>, utterance: &str) -> AnswerBody {
    AnswerBody {
        tenant_id: tenant.map(str::to_string),
        utterance: utterance.to_string(),
        conversation_id: None,
        max_rounds: None,
    }
}

#[tokio::test]
async fn answer_returns_outcome() {
    let Json(outcome) = answer::answer_handler(
        State(state(None)),
        Json(body(Some("biz-1"), "reviews today")),
    )
    .await
    .expect("answer");
    assert_eq!(outcome.answer, "You have 2 reviews.");
    assert!(outcome.complete);
    assert_eq!(outcome.steps[0].operation, "reviews.list");
}

#[tokio::test]
async fn answer_uses_default_tenant() {
    let Json(outcome) = answer::answer_handler(
        State(state(Some("biz-default"))),
        Json(body(None, "reviews today")),
    )
    .await
    .expect("answer");
    assert_eq!(outcome.steps[0].arguments["business_id"], "biz-default");
}

#[tokio::test]
async fn missing_tenant_is_bad_request() {
    let err = answer::answer_handler(State(state(None)), Json(body(None, "reviews")))
        .await
        .expect_err("no tenant");
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unresolved_question_is_unprocessable() {
    let err = answer::answer_handler(
        State(state(None)),
        Json(body(Some("biz-1"), "tell me a joke")),
    )
    .await
    .expect_err("unresolved");
    assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err.body.kind, "intent_unresolved");
}

#[tokio::test]
async fn transport_failure_is_bad_gateway() {
    let err = answer::answer_handler(
        State(state(None)),
        Json(body(Some("biz-1"), "list leads")),
    )
    .await
    .expect_err("leads.list is not served");
    assert_eq!(err.status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn entities_lists_registry() {
    let Json(response) = entities::entities_handler(State(state(None))).await;
    assert_eq!(response.entities.len(), 9);
    let review = response
        .entities
        .iter()
        .find(|e| e.entity == "review")
        .expect("review entity");
    assert_eq!(review.fallback.as_deref(), Some("live_ops.events"));
}

#[tokio::test]
async fn health_reports_pool_capacity() {
    let Json(response) = health::health_handler(State(state(None))).await;
    assert_eq!(response.status, "ok");
    assert_eq!(response.transport, "reviews-only");
    assert_eq!(response.max_sessions, 3);
    assert_eq!(response.available_sessions, 3);
}

#[test]
fn openapi_documents_routes() {
    let doc = ApiDoc::openapi();
    for path in ["/answer", "/entities", "/health"] {
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
