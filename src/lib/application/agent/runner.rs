use super::directive::Directive;
use super::errors::AgentError;
use super::models::AgentOutcome;
use super::parser::classify_response;
use super::prompt::round_prompt;
use super::state::{LoopPhase, LoopState};
use crate::application::client::{CompletionClient, CompletionRequest, summarise};
use crate::application::dispatcher::Dispatcher;
use crate::application::tooling::ToolTransport;
use crate::domain::Intent;
use crate::types::ChatMessage;
use tracing::{debug, info, warn};

/// Alternates tool calls and reasoning rounds until the engine answers or
/// the round cap is reached.
pub struct OrchestrationLoop<'a> {
    client: &'a CompletionClient,
    dispatcher: Dispatcher<'a>,
    system_prompt: String,
    max_rounds: usize,
}

impl<'a> OrchestrationLoop<'a> {
    pub fn new(
        client: &'a CompletionClient,
        dispatcher: Dispatcher<'a>,
        system_prompt: String,
        max_rounds: usize,
    ) -> Self {
        Self {
            client,
            dispatcher,
            system_prompt,
            max_rounds: max_rounds.max(1),
        }
    }

    pub async fn run(
        &self,
        session: &dyn ToolTransport,
        tenant_id: &str,
        intent: Intent,
        memory: Vec<ChatMessage>,
    ) -> Result<AgentOutcome, AgentError> {
        info!(entity = %intent.entity, max_rounds = self.max_rounds, "Orchestration loop started");
        let mut state = LoopState::new(intent);
        let mut memory = Some(memory);

        loop {
            match state.phase {
                LoopPhase::Start => {
                    state.phase = LoopPhase::AwaitingToolResult;
                }
                LoopPhase::AwaitingToolResult => {
                    let intent = state.current.clone();
                    let fetched = self.dispatcher.fetch_rows(session, tenant_id, &intent).await?;
                    let result = fetched.result;
                    debug!(
                        round = state.round + 1,
                        entity = %intent.entity,
                        operation = result.operation.as_str(),
                        used_fallback = result.used_fallback,
                        "Tool result received"
                    );
                    state.record(intent, fetched.arguments, result);
                    state.phase = LoopPhase::Reasoning;
                }
                LoopPhase::Reasoning => {
                    let request = CompletionRequest {
                        system_prompt: Some(self.system_prompt.clone()),
                        history: memory.take().unwrap_or_default(),
                        prompt: round_prompt(&state, tenant_id, self.max_rounds),
                    };
                    let content = self.client.complete(request).await?;
                    match classify_response(&content, &state.current) {
                        Directive::Final { answer } if answer.trim().is_empty() => {
                            warn!(round = state.round, "Model returned an empty answer");
                            state.conclude_partial(
                                "The model returned an empty answer, so this summary was built from the retrieved data."
                                    .to_string(),
                            );
                        }
                        Directive::Final { answer } => {
                            info!(round = state.round, answer = %summarise(&answer), "Model returned final answer");
                            state.conclude(answer);
                        }
                        Directive::CallTool { intent } if state.round >= self.max_rounds => {
                            warn!(
                                rounds = state.round,
                                requested = %intent.entity,
                                "Round limit reached, returning partial answer"
                            );
                            state.conclude_partial(format!(
                                "Stopped after {} tool calls; the answer may be incomplete.",
                                state.round
                            ));
                        }
                        Directive::CallTool { intent } => {
                            info!(round = state.round, entity = %intent.entity, "Model requested another tool call");
                            state.current = intent;
                            state.phase = LoopPhase::AwaitingToolResult;
                        }
                    }
                }
                LoopPhase::Done => {
                    let outcome = state.into_outcome();
                    info!(rounds = outcome.rounds, complete = outcome.complete, "Orchestration loop finished");
                    return Ok(outcome);
                }
            }
        }
    }
}
