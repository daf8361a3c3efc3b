use super::error::ToolInvokeError;
use super::interface::ToolTransport;
use super::result::RawToolResult;
use crate::config::HttpTransportConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

/// Tool server exposing `POST {base_url}/tools/call`.
#[derive(Clone)]
pub struct HttpTransport {
    name: String,
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl HttpTransport {
    pub fn from_config(config: &HttpTransportConfig) -> Result<Self, ToolInvokeError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| ToolInvokeError::Transport {
                server: config.name.clone(),
                message: err.to_string(),
            })?;
        Ok(Self {
            name: config.name.clone(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            http,
        })
    }

    fn build_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    fn transport_error(&self, err: reqwest::Error) -> ToolInvokeError {
        ToolInvokeError::Transport {
            server: self.name.clone(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl ToolTransport for HttpTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(
        &self,
        operation: &str,
        arguments: Value,
    ) -> Result<RawToolResult, ToolInvokeError> {
        let url = self.build_url("/tools/call");
        info!(server = %self.name, operation, "calling HTTP tool endpoint");

        let mut request = self
            .http
            .post(&url)
            .json(&json!({ "name": operation, "arguments": arguments }));
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            request = request.header("X-API-Key", key);
        }

        let response = request.send().await.map_err(|err| self.transport_error(err))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(err))?;
        debug!(server = %self.name, operation, status = status.as_u16(), bytes = body.len(), "tool endpoint answered");

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body).into_owned();
            return Err(ToolInvokeError::from_status(
                &self.name,
                operation,
                status.as_u16(),
                text,
            ));
        }

        Ok(decode_body(&body))
    }
}

/// MCP-shaped bodies keep their envelope semantics; any other JSON is
/// already the payload.
fn decode_body(body: &[u8]) -> RawToolResult {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => {
            let enveloped = value
                .as_object()
                .is_some_and(|map| map.contains_key("content") || map.contains_key("structuredContent"));
            if enveloped {
                RawToolResult::from_call_result(value)
            } else {
                RawToolResult::Structured(value)
            }
        }
        Err(_) => RawToolResult::Blob(body.to_vec()),
    }
}
