use super::dto::{AnswerBody, EntitiesResponse, EntityInfo, ErrorResponse, HealthResponse};
use super::routes;
use crate::agent::{AgentOutcome, AgentStep};
use crate::application::tooling::ResultShape;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::answer::answer_handler,
        routes::entities::entities_handler,
        routes::health::health_handler
    ),
    components(
        schemas(
            AnswerBody,
            AgentOutcome,
            AgentStep,
            ResultShape,
            ErrorResponse,
            EntityInfo,
            EntitiesResponse,
            HealthResponse
        )
    ),
    tags(
        (name = "answer", description = "Answer business questions for a tenant"),
        (name = "entities", description = "Registered business entities"),
        (name = "health", description = "Liveness and session capacity")
    )
)]
pub(super) struct ApiDoc;
