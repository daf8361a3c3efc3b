use super::*;
use crate::application::client::{ClientConfig, CompletionClient};
use crate::application::intent::FixedClock;
use crate::application::registry::ToolRegistry;
use crate::application::tooling::{ContentBlock, RawToolResult, SessionPool, ToolInvokeError, ToolTransport};
use crate::config::{FallbackPolicy, PolicyConfig};
use crate::domain::EntityKey;
use crate::model::{ModelError, ModelProvider, ModelRequest, ModelResponse};
use crate::types::MessageRole;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Clone)]
struct ScriptedProvider {
    responses: Arc<Mutex<Vec<String>>>,
    recordings: Arc<Mutex<Vec<ModelRequest>>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    /// Replies in order; the last reply repeats once the script runs out.
    fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(
                responses.into_iter().map(String::from).collect(),
            )),
            recordings: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(vec![r#"{"action":"final","response":"late"}"#])
        }
    }

    async fn requests(&self) -> Vec<ModelRequest> {
        self.recordings.lock().await.clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.recordings.lock().await.push(request);
        let mut responses = self.responses.lock().await;
        let response = if responses.len() > 1 {
            responses.remove(0)
        } else {
            responses.first().cloned().unwrap_or_default()
        };
        Ok(ModelResponse::new(response))
    }
}

#[derive(Clone, Default)]
struct StubTransport {
    results: Arc<HashMap<String, Value>>,
    down: Arc<Vec<String>>,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl StubTransport {
    fn with(results: Vec<(&str, Value)>) -> Self {
        Self {
            results: Arc::new(
                results
                    .into_iter()
                    .map(|(op, value)| (op.to_string(), value))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    fn with_down(mut self, operations: Vec<&str>) -> Self {
        self.down = Arc::new(operations.into_iter().map(String::from).collect());
        self
    }

    async fn operations(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|(op, _)| op.clone())
            .collect()
    }
}

#[async_trait]
impl ToolTransport for StubTransport {
    fn name(&self) -> &str {
        "stub"
    }

    async fn invoke(&self, operation: &str, arguments: Value) -> Result<RawToolResult, ToolInvokeError> {
        self.calls
            .lock()
            .await
            .push((operation.to_string(), arguments));
        if self.down.iter().any(|op| op == operation) {
            return Err(ToolInvokeError::Transport {
                server: "stub".into(),
                message: "broken pipe".into(),
            });
        }
        match self.results.get(operation) {
            Some(value) => Ok(RawToolResult::Blocks(vec![ContentBlock::Text(
                value.to_string(),
            )])),
            None => Err(ToolInvokeError::NotFound {
                server: "stub".into(),
                operation: operation.into(),
            }),
        }
    }
}

fn leads() -> Value {
    json!([
        {"id": "A", "source": "web"},
        {"id": "B", "source": "web"},
        {"id": "C", "source": "referral"}
    ])
}

fn orchestrator(provider: &ScriptedProvider, transport: &StubTransport) -> Orchestrator {
    let client = Arc::new(CompletionClient::new(
        Arc::new(provider.clone()),
        ClientConfig::new("test-model"),
    ));
    let pool = SessionPool::new(Arc::new(transport.clone()), 2);
    let today = NaiveDate::from_ymd_opt(2024, 5, 1).expect("date");
    Orchestrator::new(Arc::new(ToolRegistry::builtin()), pool, client)
        .with_clock(Arc::new(FixedClock(today)))
}

#[tokio::test]
async fn single_round_final_answer() {
    let provider = ScriptedProvider::new(vec![
        r#"{"action":"final","response":"Web brought 2 leads, referral 1."}"#,
    ]);
    let transport = StubTransport::with(vec![("leads.list", leads())]);
    let orchestrator = orchestrator(&provider, &transport);

    let outcome = orchestrator
        .answer("biz-1", "group by lead source")
        .await
        .expect("answer");

    assert_eq!(outcome.answer, "Web brought 2 leads, referral 1.");
    assert!(outcome.complete);
    assert_eq!(outcome.rounds, 1);
    assert!(outcome.note.is_none());
    assert_eq!(outcome.steps[0].digest, "grouped by source: referral: 1, web: 2");
    assert_eq!(outcome.steps[0].arguments["business_id"], "biz-1");

    let requests = provider.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].messages[0].role, MessageRole::System);
    assert!(requests[0].messages[0].content.contains("call_tool"));
    let prompt: Value =
        serde_json::from_str(&requests[0].messages[1].content).expect("round prompt is JSON");
    assert_eq!(prompt["results"][0]["reduction"]["counts"], json!({"web": 2, "referral": 1}));
}

#[tokio::test]
async fn engine_can_request_a_second_entity() {
    let provider = ScriptedProvider::new(vec![
        r#"{"action":"call_tool","entity":"invoice","instruction":"count unpaid invoices","filters":{"status":"unpaid"}}"#,
        r#"{"action":"final","response":"3 leads and 1 unpaid invoice."}"#,
    ]);
    let transport = StubTransport::with(vec![
        ("leads.list", leads()),
        ("invoice.list", json!({"items": [{"id": 9, "status": "unpaid"}]})),
    ]);
    let orchestrator = orchestrator(&provider, &transport);

    let outcome = orchestrator
        .answer("biz-1", "how many new leads today?")
        .await
        .expect("answer");

    assert!(outcome.complete);
    assert_eq!(outcome.rounds, 2);
    assert_eq!(transport.operations().await, vec!["leads.list", "invoice.list"]);
    assert_eq!(outcome.steps[1].entity, "invoice");
    assert_eq!(outcome.steps[1].arguments["status"], "unpaid");

    let requests = provider.requests().await;
    let second: Value =
        serde_json::from_str(&requests[1].messages.last().expect("prompt").content).expect("json");
    assert_eq!(second["results"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn round_cap_ends_with_partial_answer() {
    let provider = ScriptedProvider::new(vec![r#"{"action":"call_tool","entity":"lead"}"#]);
    let transport = StubTransport::with(vec![("leads.list", leads())]);
    let policy = PolicyConfig {
        max_rounds: 3,
        ..PolicyConfig::default()
    };
    let orchestrator = orchestrator(&provider, &transport).with_policy(&policy);

    let outcome = orchestrator
        .answer("biz-1", "group by lead source")
        .await
        .expect("partial answer");

    assert!(!outcome.complete);
    assert_eq!(outcome.rounds, 3);
    assert_eq!(transport.operations().await.len(), 3);
    assert_eq!(provider.requests().await.len(), 3);
    assert!(outcome.note.as_deref().is_some_and(|n| n.contains("incomplete")));
    assert!(outcome.answer.contains("web: 2"));
}

#[tokio::test]
async fn request_max_rounds_overrides_policy() {
    let provider = ScriptedProvider::new(vec![r#"{"action":"call_tool","entity":"lead"}"#]);
    let transport = StubTransport::with(vec![("leads.list", leads())]);
    let orchestrator = orchestrator(&provider, &transport);

    let outcome = orchestrator
        .answer_with(AnswerRequest::new("biz-1", "leads").with_max_rounds(1))
        .await
        .expect("partial");
    assert_eq!(outcome.rounds, 1);
    assert!(!outcome.complete);
}

#[tokio::test]
async fn fallback_operation_is_used_once() {
    let provider = ScriptedProvider::new(vec![r#"{"action":"final","response":"ok"}"#]);
    let transport = StubTransport::with(vec![("appointments_list", json!([{"id": 1}]))])
        .with_down(vec!["appointments.list"]);
    let orchestrator = orchestrator(&provider, &transport);

    let outcome = orchestrator
        .answer("biz-1", "appointments today")
        .await
        .expect("answer");
    assert!(outcome.steps[0].used_fallback);
    assert_eq!(
        transport.operations().await,
        vec!["appointments.list", "appointments_list"]
    );
    assert_eq!(outcome.steps[0].arguments["date_from"], "2024-05-01");
}

#[tokio::test]
async fn step_records_the_arguments_the_fallback_received() {
    let provider = ScriptedProvider::new(vec![r#"{"action":"final","response":"ok"}"#]);
    let transport = StubTransport::with(vec![("analytics.report", json!({"footfall": 40}))])
        .with_down(vec!["daily_summary.generate"]);
    let orchestrator = orchestrator(&provider, &transport);

    let outcome = orchestrator
        .answer("biz-1", "daily summary for today")
        .await
        .expect("answer");
    let sent = transport.calls.lock().await.clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(outcome.steps[0].operation, "analytics.report");
    assert_eq!(outcome.steps[0].arguments, sent[1].1);
    assert_eq!(outcome.steps[0].arguments["period"], "2024-05-01..2024-05-01");
}

#[tokio::test]
async fn native_only_policy_surfaces_transport_error() {
    let provider = ScriptedProvider::new(vec![r#"{"action":"final","response":"ok"}"#]);
    let transport = StubTransport::default().with_down(vec!["appointments.list"]);
    let policy = PolicyConfig {
        fallback: FallbackPolicy::NativeOnly,
        ..PolicyConfig::default()
    };
    let orchestrator = orchestrator(&provider, &transport).with_policy(&policy);

    let err = orchestrator
        .answer("biz-1", "appointments today")
        .await
        .expect_err("transport error");
    assert!(matches!(err, AgentError::ToolTransport(_)));
    assert_eq!(transport.operations().await, vec!["appointments.list"]);
    assert!(provider.requests().await.is_empty());
}

#[tokio::test]
async fn engine_asking_for_unknown_entity_is_a_hard_error() {
    let provider = ScriptedProvider::new(vec![r#"{"action":"call_tool","entity":"payroll"}"#]);
    let transport = StubTransport::with(vec![("leads.list", leads())]);
    let orchestrator = orchestrator(&provider, &transport);

    let err = orchestrator
        .answer("biz-1", "leads")
        .await
        .expect_err("unknown entity");
    match err {
        AgentError::UnknownEntity { entity } => assert_eq!(entity, EntityKey::from("payroll")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unresolved_utterance_makes_no_calls() {
    let provider = ScriptedProvider::new(vec!["unused"]);
    let transport = StubTransport::default();
    let orchestrator = orchestrator(&provider, &transport);

    let err = orchestrator
        .answer("biz-1", "what is the weather like?")
        .await
        .expect_err("unresolved");
    assert!(matches!(err, AgentError::IntentUnresolved(_)));
    assert!(transport.operations().await.is_empty());
    assert!(provider.requests().await.is_empty());
}

#[tokio::test]
async fn empty_tenant_is_rejected() {
    let provider = ScriptedProvider::new(vec!["unused"]);
    let transport = StubTransport::default();
    let err = orchestrator(&provider, &transport)
        .answer("  ", "leads")
        .await
        .expect_err("invalid");
    assert_eq!(err.kind(), "invalid_request");
}

#[tokio::test]
async fn empty_final_answer_falls_back_to_digest() {
    let provider = ScriptedProvider::new(vec![r#"{"action":"final","response":"   "}"#]);
    let transport = StubTransport::with(vec![("leads.list", leads())]);
    let outcome = orchestrator(&provider, &transport)
        .answer("biz-1", "group by lead source")
        .await
        .expect("answer");
    assert!(!outcome.complete);
    assert!(!outcome.answer.trim().is_empty());
    assert!(outcome.note.is_some());
}

#[tokio::test]
async fn conversation_memory_is_replayed_on_next_request() {
    let provider = ScriptedProvider::new(vec![
        r#"{"action":"final","response":"first answer"}"#,
        r#"{"action":"final","response":"second answer"}"#,
    ]);
    let transport = StubTransport::with(vec![("leads.list", leads())]);
    let orchestrator = orchestrator(&provider, &transport);

    orchestrator
        .answer_with(AnswerRequest::new("biz-1", "new leads").with_conversation("c-1"))
        .await
        .expect("first");
    orchestrator
        .answer_with(AnswerRequest::new("biz-1", "leads from web").with_conversation("c-1"))
        .await
        .expect("second");

    let requests = provider.requests().await;
    let second = &requests[1].messages;
    assert_eq!(second[1].role, MessageRole::User);
    assert_eq!(second[1].content, "new leads");
    assert_eq!(second[2].role, MessageRole::Assistant);
    assert_eq!(second[2].content, "first answer");
}

#[tokio::test(start_paused = true)]
async fn timeout_drops_request_and_releases_session() {
    let provider = ScriptedProvider::slow(Duration::from_secs(600));
    let transport = StubTransport::with(vec![("leads.list", leads())]);
    let orchestrator = orchestrator(&provider, &transport);
    assert_eq!(orchestrator.pool().available(), 2);

    let err = orchestrator
        .answer_within(AnswerRequest::new("biz-1", "leads"), Duration::from_secs(5))
        .await
        .expect_err("deadline");
    assert!(matches!(err, AgentError::TimedOut { .. }));
    assert_eq!(orchestrator.pool().available(), 2);
    assert_eq!(transport.operations().await.len(), 1);
}
