use crate::agent::Orchestrator;
use std::sync::Arc;

pub(crate) struct ServerState {
    orchestrator: Arc<Orchestrator>,
    default_tenant: Option<String>,
}

impl ServerState {
    pub(crate) fn new(orchestrator: Arc<Orchestrator>, default_tenant: Option<String>) -> Self {
        Self {
            orchestrator,
            default_tenant,
        }
    }

    pub(crate) fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub(crate) fn default_tenant(&self) -> Option<&str> {
        self.default_tenant.as_deref()
    }
}
