use crate::application::dispatcher::DispatchError;
use crate::application::intent::IntentError;
use crate::application::registry::RegistryError;
use crate::application::tooling::ToolInvokeError;
use crate::domain::EntityKey;
use crate::model::ModelError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("no tool is registered for entity '{entity}'")]
    UnknownEntity { entity: EntityKey },
    #[error(transparent)]
    IntentUnresolved(#[from] IntentError),
    #[error(transparent)]
    ToolTransport(DispatchError),
    #[error("completion engine failed: {0}")]
    Completion(#[from] ModelError),
    #[error("could not open a tool session: {0}")]
    Session(#[from] ToolInvokeError),
    #[error("request did not finish within {after:?}")]
    TimedOut { after: Duration },
}

impl From<DispatchError> for AgentError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::UnknownEntity(RegistryError::UnknownEntity(entity)) => {
                AgentError::UnknownEntity { entity }
            }
            other => AgentError::ToolTransport(other),
        }
    }
}

impl AgentError {
    /// Stable machine-readable tag for surfaces.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::InvalidRequest(_) => "invalid_request",
            AgentError::UnknownEntity { .. } => "unknown_entity",
            AgentError::IntentUnresolved(_) => "intent_unresolved",
            AgentError::ToolTransport(_) => "tool_transport",
            AgentError::Completion(_) => "completion",
            AgentError::Session(_) => "session",
            AgentError::TimedOut { .. } => "timed_out",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            AgentError::InvalidRequest(reason) => format!("The request is invalid: {reason}."),
            AgentError::UnknownEntity { entity } => {
                format!("There is no data source for \"{entity}\", so it could not be retrieved.")
            }
            AgentError::IntentUnresolved(IntentError::Unresolved { .. }) => {
                "Could not tell which business data the question is about. Mention appointments, invoices, leads, reviews, analytics or campaigns."
                    .to_string()
            }
            AgentError::ToolTransport(err) => err.user_message(),
            AgentError::Completion(err) => err.user_message(),
            AgentError::Session(err) => err.user_message(),
            AgentError::TimedOut { after } => format!(
                "The question could not be answered within {} seconds.",
                after.as_secs()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_entity_dispatch_error_maps_to_hard_error() {
        let err: AgentError =
            DispatchError::UnknownEntity(RegistryError::UnknownEntity(EntityKey::from("payroll")))
                .into();
        assert!(matches!(err, AgentError::UnknownEntity { .. }));
        assert_eq!(err.kind(), "unknown_entity");
        assert!(err.user_message().contains("payroll"));
    }

    #[test]
    fn transport_failure_keeps_dispatch_context() {
        let err: AgentError = DispatchError::Transport {
            entity: EntityKey::Lead,
            operation: "leads.list".into(),
            source: ToolInvokeError::Terminated {
                server: "crm".into(),
            },
        }
        .into();
        assert_eq!(err.kind(), "tool_transport");
        assert!(err.user_message().contains("lead"));
    }

    #[test]
    fn double_failure_mentions_the_alternative_source() {
        let err: AgentError = DispatchError::FallbackFailed {
            entity: EntityKey::Review,
            operation: "reviews.list".into(),
            first: ToolInvokeError::Terminated {
                server: "crm".into(),
            },
            fallback: "live_ops.events".into(),
            source: ToolInvokeError::Terminated {
                server: "crm".into(),
            },
        }
        .into();
        assert_eq!(err.kind(), "tool_transport");
        assert!(err.user_message().contains("alternative source failed"));
    }
}
