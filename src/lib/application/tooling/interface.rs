use async_trait::async_trait;
use serde_json::Value;

use super::error::ToolInvokeError;
use super::result::RawToolResult;

/// Request/response channel to the remote business-data tools.
///
/// Implementations must be usable from concurrent requests; the wire
/// encoding is theirs to choose.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    /// Short label used in logs and error messages.
    fn name(&self) -> &str;

    async fn invoke(&self, operation: &str, arguments: Value)
    -> Result<RawToolResult, ToolInvokeError>;

    /// Releases connections or child processes. Later calls may reopen them.
    async fn shutdown(&self) {}
}
