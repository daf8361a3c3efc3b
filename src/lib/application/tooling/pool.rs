use super::error::ToolInvokeError;
use super::interface::ToolTransport;
use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// Bounds how many requests use the shared transport at once.
#[derive(Clone)]
pub struct SessionPool {
    transport: Arc<dyn ToolTransport>,
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl SessionPool {
    pub fn new(transport: Arc<dyn ToolTransport>, max_sessions: usize) -> Self {
        let capacity = max_sessions.max(1);
        Self {
            transport,
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a free slot. The slot is returned when the session drops.
    pub async fn acquire(&self) -> Result<ToolSession, ToolInvokeError> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| ToolInvokeError::PoolClosed)?;
        debug!(
            server = self.transport.name(),
            available = self.permits.available_permits(),
            "tool session acquired"
        );
        Ok(ToolSession {
            transport: Arc::clone(&self.transport),
            _permit: permit,
        })
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn transport(&self) -> &Arc<dyn ToolTransport> {
        &self.transport
    }

    pub fn close(&self) {
        self.permits.close();
    }
}

/// Scoped handle to the transport.
pub struct ToolSession {
    transport: Arc<dyn ToolTransport>,
    _permit: OwnedSemaphorePermit,
}

impl Deref for ToolSession {
    type Target = dyn ToolTransport;

    fn deref(&self) -> &Self::Target {
        self.transport.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::tooling::RawToolResult;
    use async_trait::async_trait;
    use serde_json::Value;

    struct Null;

    #[async_trait]
    impl ToolTransport for Null {
        fn name(&self) -> &str {
            "null"
        }

        async fn invoke(&self, _: &str, _: Value) -> Result<RawToolResult, ToolInvokeError> {
            Ok(RawToolResult::Blocks(Vec::new()))
        }
    }

    #[tokio::test]
    async fn permits_return_on_drop() {
        let pool = SessionPool::new(Arc::new(Null), 2);
        let first = pool.acquire().await.expect("first");
        let second = pool.acquire().await.expect("second");
        assert_eq!(pool.available(), 0);
        drop(first);
        assert_eq!(pool.available(), 1);
        drop(second);
        assert_eq!(pool.available(), pool.capacity());
    }

    #[tokio::test]
    async fn closed_pool_refuses_sessions() {
        let pool = SessionPool::new(Arc::new(Null), 1);
        pool.close();
        assert!(matches!(
            pool.acquire().await,
            Err(ToolInvokeError::PoolClosed)
        ));
    }

    #[tokio::test]
    async fn session_derefs_to_transport() {
        let pool = SessionPool::new(Arc::new(Null), 1);
        let session = pool.acquire().await.expect("session");
        assert_eq!(session.name(), "null");
    }
}
