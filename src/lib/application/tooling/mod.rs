mod error;
mod http;
mod interface;
mod normalize;
mod pool;
mod process;
mod result;

pub use error::ToolInvokeError;
pub use http::HttpTransport;
pub use interface::ToolTransport;
pub use normalize::{NormalizedResult, ResultShape, normalize};
pub use pool::{SessionPool, ToolSession};
pub use process::StdioTransport;
pub use result::{ContentBlock, RawToolResult};

use crate::config::TransportConfig;
use std::sync::Arc;

/// Builds the configured transport. Stdio servers are spawned lazily on
/// first use.
pub fn build_transport(config: &TransportConfig) -> Result<Arc<dyn ToolTransport>, ToolInvokeError> {
    Ok(match config {
        TransportConfig::Stdio(stdio) => Arc::new(StdioTransport::new(stdio.clone())),
        TransportConfig::Http(http) => Arc::new(HttpTransport::from_config(http)?),
    })
}
