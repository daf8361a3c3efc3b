//! JSON-lines surface: one request object per input line, one response
//! object per output line, answered in order.

use crate::agent::{AgentError, AgentOutcome, AgentStep, AnswerRequest, Orchestrator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StdioError {
    #[error("stdin/stdout I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct StdioRequest {
    #[serde(default)]
    tenant_id: Option<String>,
    utterance: String,
    #[serde(default)]
    conversation_id: Option<String>,
    #[serde(default)]
    max_rounds: Option<usize>,
}

#[derive(Debug, Default, Serialize)]
pub struct StdioResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub complete: bool,
    pub rounds: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub steps: Vec<AgentStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StdioErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct StdioErrorBody {
    pub kind: String,
    pub message: String,
}

impl From<AgentOutcome> for StdioResponse {
    fn from(outcome: AgentOutcome) -> Self {
        Self {
            answer: Some(outcome.answer),
            complete: outcome.complete,
            rounds: outcome.rounds,
            note: outcome.note,
            steps: outcome.steps,
            error: None,
        }
    }
}

impl StdioResponse {
    fn failure(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: Some(StdioErrorBody {
                kind: kind.into(),
                message: message.into(),
            }),
            ..Self::default()
        }
    }

    fn from_error(err: &AgentError) -> Self {
        Self::failure(err.kind(), err.user_message())
    }
}

/// Serves stdin/stdout until stdin closes.
pub async fn run(
    orchestrator: Arc<Orchestrator>,
    default_tenant: Option<String>,
) -> Result<(), StdioError> {
    info!("STDIO JSON-lines mode ready");
    serve(
        orchestrator.as_ref(),
        default_tenant.as_deref(),
        BufReader::new(io::stdin()),
        io::stdout(),
    )
    .await
}

pub async fn serve<R, W>(
    orchestrator: &Orchestrator,
    default_tenant: Option<&str>,
    reader: R,
    mut writer: W,
) -> Result<(), StdioError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let response = handle_line(orchestrator, default_tenant, input).await;
        let encoded = serde_json::to_string(&response)?;
        writer.write_all(encoded.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    debug!("STDIO input closed");
    Ok(())
}

async fn handle_line(
    orchestrator: &Orchestrator,
    default_tenant: Option<&str>,
    input: &str,
) -> StdioResponse {
    let request: StdioRequest = match serde_json::from_str(input) {
        Ok(request) => request,
        Err(err) => {
            warn!(%err, "Rejected malformed STDIO request");
            return StdioResponse::failure("invalid_json", format!("Request is not valid JSON: {err}"));
        }
    };
    let Some(tenant_id) = request.tenant_id.or(default_tenant.map(str::to_string)) else {
        return StdioResponse::failure("invalid_request", "tenant_id is required.");
    };

    let mut answer_request = AnswerRequest::new(tenant_id, request.utterance);
    answer_request.conversation_id = request.conversation_id;
    answer_request.max_rounds = request.max_rounds;

    match orchestrator.answer_with(answer_request).await {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            warn!(kind = err.kind(), %err, "STDIO request failed");
            StdioResponse::from_error(&err)
        }
    }
}
