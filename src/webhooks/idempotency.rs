use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;

/// Trait for recording acknowledged webhook deliveries so redeliveries are
/// acked without being processed twice
///
/// Keys are opaque to the store; the handler uses `<provider>:<signature>`,
/// which identifies a delivery without parsing its payload.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Check if a delivery has already been processed
    async fn is_processed(&self, key: &str) -> Result<bool>;

    /// Mark a delivery as processed
    async fn mark_processed(&self, key: String) -> Result<()>;
}

/// In-memory idempotency store (for development/testing)
///
/// In production, use a database-backed store so dedup survives restarts.
pub struct MemoryIdempotencyStore {
    processed: Arc<RwLock<HashSet<String>>>,
}

impl MemoryIdempotencyStore {
    pub fn new() -> Self {
        Self {
            processed: Arc::new(RwLock::new(HashSet::new())),
        }
    }
}

impl Default for MemoryIdempotencyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdempotencyStore for MemoryIdempotencyStore {
    async fn is_processed(&self, key: &str) -> Result<bool> {
        let processed = self.processed.read().await;
        Ok(processed.contains(key))
    }

    async fn mark_processed(&self, key: String) -> Result<()> {
        let mut processed = self.processed.write().await;
        processed.insert(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unseen_key_is_not_processed() {
        let store = MemoryIdempotencyStore::new();
        assert!(!store.is_processed("ramp:abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_marked_key_is_processed() {
        let store = MemoryIdempotencyStore::new();
        store.mark_processed("ramp:abc".to_string()).await.unwrap();

        assert!(store.is_processed("ramp:abc").await.unwrap());
        assert!(!store.is_processed("nium:abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_marking_is_idempotent() {
        let store = MemoryIdempotencyStore::new();
        store.mark_processed("ramp:abc".to_string()).await.unwrap();
        store.mark_processed("ramp:abc".to_string()).await.unwrap();

        assert!(store.is_processed("ramp:abc").await.unwrap());
    }
}
