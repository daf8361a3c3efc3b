use super::errors::AgentError;
use super::models::{AgentOutcome, AnswerRequest};
use super::prompt::{PROTOCOL, entity_guidance};
use super::runner::OrchestrationLoop;
use crate::application::client::{ClientConfig, CompletionClient};
use crate::application::dispatcher::Dispatcher;
use crate::application::intent::{Clock, IntentParser, SystemClock};
use crate::application::memory::ConversationMemory;
use crate::application::registry::ToolRegistry;
use crate::application::tooling::{SessionPool, ToolTransport};
use crate::config::{AppConfig, FallbackPolicy, PolicyConfig};
use crate::model::ModelProvider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// Answers business questions for a tenant.
///
/// Holds only shared, read-only collaborators; every call to
/// [`Orchestrator::answer`] runs its own loop with private state.
pub struct Orchestrator {
    registry: Arc<ToolRegistry>,
    parser: IntentParser,
    clock: Arc<dyn Clock>,
    pool: SessionPool,
    client: Arc<CompletionClient>,
    memory: Arc<ConversationMemory>,
    policy: FallbackPolicy,
    max_rounds: usize,
    request_timeout: Option<Duration>,
}

impl Orchestrator {
    pub fn new(registry: Arc<ToolRegistry>, pool: SessionPool, client: Arc<CompletionClient>) -> Self {
        let defaults = PolicyConfig::default();
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::default());
        Self {
            registry,
            parser: IntentParser::new(Arc::clone(&clock)),
            clock,
            pool,
            client,
            memory: Arc::new(ConversationMemory::new(defaults.memory_turns)),
            policy: defaults.fallback,
            max_rounds: defaults.max_rounds,
            request_timeout: None,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn ModelProvider>,
        transport: Arc<dyn ToolTransport>,
    ) -> Self {
        let registry = Arc::new(ToolRegistry::from_config(&config.entities));
        let pool = SessionPool::new(transport, config.policy.max_sessions);
        let client = Arc::new(CompletionClient::new(
            provider,
            ClientConfig::from_app_config(config),
        ));
        info!(
            entities = registry.entities().len(),
            max_sessions = pool.capacity(),
            "Orchestrator configured"
        );
        Self::new(registry, pool, client)
            .with_clock(Arc::new(SystemClock::with_offset_minutes(
                config.policy.utc_offset_minutes,
            )))
            .with_policy(&config.policy)
    }

    /// Replaces the clock and rebuilds the default intent parser around it.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.parser = IntentParser::new(Arc::clone(&clock));
        self.clock = clock;
        self
    }

    pub fn with_parser(mut self, parser: IntentParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_policy(mut self, policy: &PolicyConfig) -> Self {
        self.policy = policy.fallback;
        self.max_rounds = policy.max_rounds.max(1);
        self.request_timeout = policy.request_timeout;
        self.memory = Arc::new(ConversationMemory::new(policy.memory_turns));
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn pool(&self) -> &SessionPool {
        &self.pool
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    pub async fn answer(&self, tenant_id: &str, utterance: &str) -> Result<AgentOutcome, AgentError> {
        self.answer_with(AnswerRequest::new(tenant_id, utterance)).await
    }

    /// Runs under the configured request deadline, if any.
    pub async fn answer_with(&self, request: AnswerRequest) -> Result<AgentOutcome, AgentError> {
        match self.request_timeout {
            Some(limit) => self.answer_within(request, limit).await,
            None => self.run_request(request).await,
        }
    }

    /// On expiry the in-flight request is dropped, which releases its session.
    pub async fn answer_within(
        &self,
        request: AnswerRequest,
        limit: Duration,
    ) -> Result<AgentOutcome, AgentError> {
        match tokio::time::timeout(limit, self.run_request(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = limit.as_millis() as u64, "Request deadline exceeded");
                Err(AgentError::TimedOut { after: limit })
            }
        }
    }

    pub fn system_prompt(&self) -> String {
        self.client
            .compose_system_prompt(&entity_guidance(&self.registry), PROTOCOL)
    }

    async fn run_request(&self, request: AnswerRequest) -> Result<AgentOutcome, AgentError> {
        let span = info_span!("answer", request_id = %Uuid::new_v4());
        self.run_traced(request).instrument(span).await
    }

    async fn run_traced(&self, request: AnswerRequest) -> Result<AgentOutcome, AgentError> {
        let tenant_id = request.tenant_id.trim();
        if tenant_id.is_empty() {
            return Err(AgentError::InvalidRequest("tenant_id must not be empty".into()));
        }
        if request.utterance.trim().is_empty() {
            return Err(AgentError::InvalidRequest("utterance must not be empty".into()));
        }

        let intent = self.parser.parse(&request.utterance)?;
        info!(
            tenant_id,
            entity = %intent.entity,
            filters = intent.filters.len(),
            "Parsed intent"
        );

        let history = match request.conversation_id.as_deref() {
            Some(id) => self.memory.history(id).await,
            None => Vec::new(),
        };

        let session = self.pool.acquire().await?;
        let dispatcher = Dispatcher::new(&self.registry, self.policy, self.clock.as_ref());
        let max_rounds = request.max_rounds.unwrap_or(self.max_rounds);
        let runner = OrchestrationLoop::new(&self.client, dispatcher, self.system_prompt(), max_rounds);
        let outcome = runner.run(&*session, tenant_id, intent, history).await?;
        drop(session);

        if let Some(id) = request.conversation_id.as_deref() {
            self.memory
                .record(id, request.utterance.trim(), &outcome.answer)
                .await;
        }
        Ok(outcome)
    }
}
