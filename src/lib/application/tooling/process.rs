use super::error::ToolInvokeError;
use super::interface::ToolTransport;
use super::result::RawToolResult;
use crate::config::StdioTransportConfig;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tracing::{debug, info, warn};

const PROTOCOL_VERSION: &str = "2025-06-18";

type Responder = oneshot::Sender<Result<Value, ToolInvokeError>>;
type PendingMap = HashMap<String, Responder>;

/// MCP server spoken to over a child process's stdin/stdout.
///
/// The process is spawned lazily on first use and respawned after it exits.
/// Concurrent calls share one process and are matched to responses by id.
#[derive(Clone)]
pub struct StdioTransport {
    inner: Arc<StdioInner>,
}

struct StdioInner {
    config: StdioTransportConfig,
    startup: AsyncMutex<()>,
    child: AsyncMutex<Option<Child>>,
    writer: AsyncMutex<Option<BufWriter<ChildStdin>>>,
    pending: Mutex<PendingMap>,
    id_counter: AtomicU64,
    catalogue: AsyncMutex<HashSet<String>>,
    catalogue_stale: AtomicBool,
}

impl StdioTransport {
    pub fn new(config: StdioTransportConfig) -> Self {
        Self {
            inner: Arc::new(StdioInner {
                config,
                startup: AsyncMutex::new(()),
                child: AsyncMutex::new(None),
                writer: AsyncMutex::new(None),
                pending: Mutex::new(HashMap::new()),
                id_counter: AtomicU64::new(1),
                catalogue: AsyncMutex::new(HashSet::new()),
                catalogue_stale: AtomicBool::new(false),
            }),
        }
    }

}

#[async_trait]
impl ToolTransport for StdioTransport {
    fn name(&self) -> &str {
        &self.inner.config.name
    }

    async fn invoke(
        &self,
        operation: &str,
        arguments: Value,
    ) -> Result<RawToolResult, ToolInvokeError> {
        self.inner.ensure_running().await?;
        if self.inner.catalogue_stale.swap(false, Ordering::SeqCst) {
            if let Err(err) = self.inner.refresh_catalogue().await {
                self.inner.catalogue_stale.store(true, Ordering::SeqCst);
                return Err(err);
            }
        }
        {
            let catalogue = self.inner.catalogue.lock().await;
            if !catalogue.is_empty() && !catalogue.contains(operation) {
                return Err(ToolInvokeError::NotFound {
                    server: self.inner.config.name.clone(),
                    operation: operation.to_string(),
                });
            }
        }
        let params = json!({
            "name": operation,
            "arguments": match arguments {
                Value::Null => Value::Object(Default::default()),
                other => other,
            }
        });
        let result = self.inner.send_request("tools/call", params).await?;
        Ok(RawToolResult::from_call_result(result))
    }

    async fn shutdown(&self) {
        self.inner.reset().await;
    }
}

impl StdioInner {
    async fn ensure_running(self: &Arc<Self>) -> Result<(), ToolInvokeError> {
        let _startup = self.startup.lock().await;
        {
            let child = self.child.lock().await;
            if child.is_some() {
                return Ok(());
            }
        }

        let mut command = Command::new(&self.config.command);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .args(&self.config.args);
        if let Some(dir) = &self.config.workdir {
            command.current_dir(dir);
        }
        for (key, value) in &self.config.env {
            command.env(key, value);
        }

        let mut child = command.spawn().map_err(|source| ToolInvokeError::Spawn {
            server: self.config.name.clone(),
            source,
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.transport_error("failed to capture server stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.transport_error("failed to capture server stdout"))?;

        *self.writer.lock().await = Some(BufWriter::new(stdin));
        *self.child.lock().await = Some(child);
        info!(server = %self.config.name, command = %self.config.command, "spawned tool server");

        let reader = Arc::clone(self);
        tokio::spawn(async move {
            reader.reader_loop(stdout).await;
        });

        if let Err(err) = self.initialize_sequence().await {
            self.reset().await;
            return Err(err);
        }
        Ok(())
    }

    async fn initialize_sequence(&self) -> Result<(), ToolInvokeError> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": {}
        });
        self.send_request("initialize", params).await?;
        self.send_notification("notifications/initialized", json!({}))
            .await?;
        self.refresh_catalogue().await
    }

    async fn refresh_catalogue(&self) -> Result<(), ToolInvokeError> {
        let result = self.send_request("tools/list", json!({})).await?;
        let names: HashSet<String> = result
            .get("tools")
            .and_then(Value::as_array)
            .map(|tools| {
                tools
                    .iter()
                    .filter_map(|tool| tool.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        debug!(server = %self.config.name, count = names.len(), "refreshed tool catalogue");
        *self.catalogue.lock().await = names;
        Ok(())
    }

    async fn reader_loop(self: Arc<Self>, stdout: ChildStdout) {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(raw)) = lines.next_line().await {
            let trimmed = raw.trim();
            if trimmed.is_empty() || !trimmed.starts_with('{') {
                debug!(server = %self.config.name, line = trimmed, "skipping non-JSON line");
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(value) => self.dispatch_inbound(value).await,
                Err(source) => {
                    warn!(server = %self.config.name, %source, "received invalid JSON from tool server");
                }
            }
        }
        self.reset().await;
    }

    async fn dispatch_inbound(&self, value: Value) {
        let id = value.get("id").cloned();
        let method = value.get("method").and_then(Value::as_str).map(str::to_string);
        let outcome = match (id, method) {
            (Some(id), Some(method)) => self.handle_server_request(id, &method).await,
            (Some(id), None) => {
                self.handle_response(id, value).await;
                Ok(())
            }
            (None, Some(method)) => {
                if method == "notifications/tools/list_changed" {
                    // Only this task delivers responses, so the re-list
                    // happens on the next invoke.
                    self.catalogue_stale.store(true, Ordering::SeqCst);
                    debug!(server = %self.config.name, "tool catalogue marked stale");
                } else {
                    debug!(server = %self.config.name, method, "ignoring notification");
                }
                Ok(())
            }
            (None, None) => Ok(()),
        };
        if let Err(err) = outcome {
            warn!(server = %self.config.name, %err, "failed to handle message from tool server");
        }
    }

    async fn handle_response(&self, id: Value, value: Value) {
        let Some(key) = response_key(&id) else {
            return;
        };
        let sender = self.lock_pending().remove(&key);
        let Some(sender) = sender else {
            debug!(server = %self.config.name, response_id = key, "response for unknown request");
            return;
        };
        let outcome = match value.get("error") {
            Some(error) => {
                let code = error.get("code").and_then(Value::as_i64).unwrap_or(-32000);
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string();
                Err((code, message))
            }
            None => Ok(value.get("result").cloned().unwrap_or(Value::Null)),
        };
        let _ = sender.send(outcome.map_err(|(code, message)| ToolInvokeError::Rpc {
            server: self.config.name.clone(),
            code,
            message,
        }));
    }

    async fn handle_server_request(&self, id: Value, method: &str) -> Result<(), ToolInvokeError> {
        let payload = if method == "ping" {
            json!({"jsonrpc": "2.0", "id": id, "result": {}})
        } else {
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {
                    "code": -32601,
                    "message": format!("client does not implement method '{method}'"),
                }
            })
        };
        self.write_message(&payload).await
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value, ToolInvokeError> {
        let id = format!("req-{}", self.id_counter.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = oneshot::channel();
        self.lock_pending().insert(id.clone(), tx);
        let _pending = PendingEntry {
            pending: &self.pending,
            id: id.clone(),
        };

        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        });
        self.write_message(&payload).await?;

        let operation = params_operation(&payload);
        match rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(ToolInvokeError::Rpc {
                server,
                code,
                message,
            })) => Err(ToolInvokeError::from_rpc(&server, &operation, code, message)),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(ToolInvokeError::Cancelled {
                server: self.config.name.clone(),
            }),
        }
    }

    async fn send_notification(&self, method: &str, params: Value) -> Result<(), ToolInvokeError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params
        });
        self.write_message(&payload).await
    }

    async fn write_message(&self, message: &Value) -> Result<(), ToolInvokeError> {
        let mut encoded =
            serde_json::to_vec(message).map_err(|source| ToolInvokeError::InvalidJson {
                server: self.config.name.clone(),
                source,
            })?;
        encoded.push(b'\n');

        let mut writer = self.writer.lock().await;
        let stream = writer
            .as_mut()
            .ok_or_else(|| self.transport_error("writer not initialised"))?;
        stream
            .write_all(&encoded)
            .await
            .map_err(|err| self.transport_error(err.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|err| self.transport_error(err.to_string()))
    }

    async fn reset(&self) {
        self.writer.lock().await.take();
        let running = self.child.lock().await.take();
        if let Some(mut child) = running {
            if let Err(err) = child.kill().await {
                debug!(server = %self.config.name, %err, "tool server already exited");
            }
            let _ = child.wait().await;
            info!(server = %self.config.name, "tool server stopped");
        }

        let drained: Vec<Responder> = self.lock_pending().drain().map(|(_, tx)| tx).collect();
        for sender in drained {
            let _ = sender.send(Err(ToolInvokeError::Terminated {
                server: self.config.name.clone(),
            }));
        }
        self.catalogue.lock().await.clear();
        self.catalogue_stale.store(false, Ordering::SeqCst);
    }

    fn lock_pending(&self) -> MutexGuard<'_, PendingMap> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transport_error(&self, message: impl Into<String>) -> ToolInvokeError {
        ToolInvokeError::Transport {
            server: self.config.name.clone(),
            message: message.into(),
        }
    }
}

/// Removes its request from the pending map when the caller stops waiting,
/// whether it got a response, failed to write, or was dropped.
struct PendingEntry<'a> {
    pending: &'a Mutex<PendingMap>,
    id: String,
}

impl Drop for PendingEntry<'_> {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

fn response_key(id: &Value) -> Option<String> {
    match id {
        Value::String(value) => Some(value.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}

/// Tool name of a `tools/call` request, or the method for anything else.
fn params_operation(payload: &Value) -> String {
    payload
        .pointer("/params/name")
        .or_else(|| payload.get("method"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
