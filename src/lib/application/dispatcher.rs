use crate::application::intent::Clock;
use crate::application::registry::{ArgumentContext, RegistryError, ToolRegistry};
use crate::application::tooling::{
    NormalizedResult, RawToolResult, ToolInvokeError, ToolTransport, normalize,
};
use crate::config::FallbackPolicy;
use crate::domain::{EntityKey, Intent};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    UnknownEntity(#[from] RegistryError),
    #[error("fetching {entity} via '{operation}' failed: {source}")]
    Transport {
        entity: EntityKey,
        operation: String,
        #[source]
        source: ToolInvokeError,
    },
    #[error(
        "fetching {entity} via '{operation}' failed ({first}), then via fallback '{fallback}': {source}"
    )]
    FallbackFailed {
        entity: EntityKey,
        operation: String,
        first: ToolInvokeError,
        fallback: String,
        #[source]
        source: ToolInvokeError,
    },
}

impl DispatchError {
    pub fn user_message(&self) -> String {
        match self {
            DispatchError::UnknownEntity(RegistryError::UnknownEntity(entity)) => {
                format!("There is no data source for \"{entity}\".")
            }
            DispatchError::Transport { entity, source, .. } => {
                format!("Could not retrieve {entity} data. {}", source.user_message())
            }
            DispatchError::FallbackFailed { entity, source, .. } => format!(
                "Could not retrieve {entity} data (the alternative source failed as well). {}",
                source.user_message()
            ),
        }
    }
}

/// A normalized result together with the arguments that produced it.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub arguments: Value,
    pub result: NormalizedResult,
}

/// Stateless: resolves, builds arguments, invokes, normalizes.
pub struct Dispatcher<'a> {
    registry: &'a ToolRegistry,
    policy: FallbackPolicy,
    clock: &'a dyn Clock,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a ToolRegistry, policy: FallbackPolicy, clock: &'a dyn Clock) -> Self {
        Self {
            registry,
            policy,
            clock,
        }
    }

    /// At most two remote calls: the first operation, then the other one
    /// only when the first failed below the application layer.
    pub async fn fetch_rows(
        &self,
        session: &dyn ToolTransport,
        tenant_id: &str,
        intent: &Intent,
    ) -> Result<Fetched, DispatchError> {
        let descriptor = self.registry.resolve(&intent.entity)?;
        let ctx = ArgumentContext::new(tenant_id, &intent.filters, self.clock.today());
        let native = Attempt {
            operation: descriptor.operation.as_str(),
            arguments: descriptor.build_arguments(&ctx),
        };
        let fallback = descriptor.fallback.as_deref().map(|operation| Attempt {
            operation,
            arguments: descriptor.build_fallback_arguments(&ctx),
        });

        let (first, second) = match (self.policy, fallback) {
            (FallbackPolicy::NativeOnly, _) | (_, None) => (native, None),
            (FallbackPolicy::NativeFirst, Some(alt)) => (native, Some(alt)),
            (FallbackPolicy::FallbackFirst, Some(alt)) => (alt, Some(native)),
        };
        let native_operation = descriptor.operation.as_str();

        info!(entity = %intent.entity, operation = first.operation, "Dispatching tool call");
        let err = match session.invoke(first.operation, first.arguments.clone()).await {
            Ok(raw) => return Ok(self.finish(&intent.entity, first, native_operation, raw)),
            Err(err) => err,
        };

        let Some(second) = second.filter(|_| err.triggers_fallback()) else {
            warn!(entity = %intent.entity, operation = first.operation, %err, "Tool call failed");
            return Err(DispatchError::Transport {
                entity: intent.entity.clone(),
                operation: first.operation.to_string(),
                source: err,
            });
        };

        warn!(
            entity = %intent.entity,
            operation = first.operation,
            fallback = second.operation,
            %err,
            "Tool call failed at transport level, retrying with fallback operation"
        );
        match session.invoke(second.operation, second.arguments.clone()).await {
            Ok(raw) => Ok(self.finish(&intent.entity, second, native_operation, raw)),
            Err(source) => {
                warn!(entity = %intent.entity, operation = second.operation, %source, "Fallback operation failed");
                Err(DispatchError::FallbackFailed {
                    entity: intent.entity.clone(),
                    operation: first.operation.to_string(),
                    first: err,
                    fallback: second.operation.to_string(),
                    source,
                })
            }
        }
    }

    fn finish(
        &self,
        entity: &EntityKey,
        attempt: Attempt<'_>,
        native: &str,
        raw: RawToolResult,
    ) -> Fetched {
        let mut result = normalize(entity, attempt.operation, raw);
        result.used_fallback = attempt.operation != native;
        Fetched {
            arguments: attempt.arguments,
            result,
        }
    }
}

struct Attempt<'d> {
    operation: &'d str,
    arguments: Value,
}
