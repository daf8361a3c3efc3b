use thiserror::Error;

/// JSON-RPC "method not found".
const RPC_METHOD_NOT_FOUND: i64 = -32601;

#[derive(Debug, Error)]
pub enum ToolInvokeError {
    #[error("tool server '{server}' does not expose operation '{operation}'")]
    NotFound { server: String, operation: String },
    #[error("tool server '{server}' does not support operation '{operation}': {message}")]
    Unsupported {
        server: String,
        operation: String,
        message: String,
    },
    #[error("failed to spawn tool server '{server}': {source}")]
    Spawn {
        server: String,
        #[source]
        source: std::io::Error,
    },
    #[error("tool server '{server}' transport error: {message}")]
    Transport { server: String, message: String },
    #[error("tool server '{server}' returned invalid JSON: {source}")]
    InvalidJson {
        server: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("tool server '{server}' returned JSON-RPC error {code}: {message}")]
    Rpc {
        server: String,
        code: i64,
        message: String,
    },
    #[error("tool server '{server}' answered HTTP {status}: {body}")]
    Http {
        server: String,
        status: u16,
        body: String,
    },
    #[error("tool server '{server}' terminated unexpectedly")]
    Terminated { server: String },
    #[error("tool server '{server}' request cancelled")]
    Cancelled { server: String },
    #[error("tool session pool is closed")]
    PoolClosed,
}

impl ToolInvokeError {
    /// Classifies a JSON-RPC error returned for `operation`.
    pub fn from_rpc(server: &str, operation: &str, code: i64, message: String) -> Self {
        let lowered = message.to_lowercase();
        if code == RPC_METHOD_NOT_FOUND
            || lowered.contains("unknown tool")
            || lowered.contains("tool not found")
        {
            return Self::NotFound {
                server: server.to_string(),
                operation: operation.to_string(),
            };
        }
        Self::Rpc {
            server: server.to_string(),
            code,
            message,
        }
    }

    /// Classifies an HTTP failure status for `operation`.
    pub fn from_status(server: &str, operation: &str, status: u16, body: String) -> Self {
        match status {
            404 => Self::NotFound {
                server: server.to_string(),
                operation: operation.to_string(),
            },
            405 | 501 => Self::Unsupported {
                server: server.to_string(),
                operation: operation.to_string(),
                message: body,
            },
            _ => Self::Http {
                server: server.to_string(),
                status,
                body,
            },
        }
    }

    /// True when the failure happened below the application layer, so an
    /// equivalent operation on the same server may still succeed.
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::Unsupported { .. }
                | Self::Transport { .. }
                | Self::Spawn { .. }
                | Self::Terminated { .. }
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { operation, .. } | Self::Unsupported { operation, .. } => {
                format!("The data service does not offer \"{operation}\".")
            }
            Self::Spawn { .. } | Self::Transport { .. } | Self::Terminated { .. } => {
                "The data service could not be reached.".to_string()
            }
            Self::InvalidJson { .. } => {
                "The data service sent a response that could not be read.".to_string()
            }
            Self::Rpc { message, .. } => format!("The data service rejected the request: {message}"),
            Self::Http { status, .. } => {
                format!("The data service rejected the request (HTTP {status}).")
            }
            Self::Cancelled { .. } | Self::PoolClosed => {
                "The request was cancelled before the data arrived.".to_string()
            }
        }
    }
}
