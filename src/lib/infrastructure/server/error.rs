use super::dto::ErrorResponse;
use crate::agent::AgentError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind HTTP listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Error body plus status, returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse {
                kind: "invalid_request".into(),
                error: message.into(),
            },
        }
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        let status = match &err {
            AgentError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AgentError::IntentUnresolved(_) | AgentError::UnknownEntity { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AgentError::ToolTransport(_) | AgentError::Completion(_) => StatusCode::BAD_GATEWAY,
            AgentError::Session(_) => StatusCode::SERVICE_UNAVAILABLE,
            AgentError::TimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
        };
        Self {
            status,
            body: ErrorResponse {
                kind: err.kind().to_string(),
                error: err.user_message(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
