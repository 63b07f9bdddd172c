//! In-process backend over [`CacheStore`].

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::backend::CacheBackend;
use crate::cache::{CacheStats, CacheStore};
use crate::error::Result;

/// A [`CacheStore`] behind a single mutex.
///
/// Every read also mutates recency order, so reads and writes share one
/// exclusive lock.
#[derive(Debug)]
pub struct LocalStore {
    inner: Mutex<CacheStore>,
}

impl LocalStore {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::from_store(CacheStore::new(capacity, ttl))
    }

    pub fn from_store(store: CacheStore) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    /// Drops every stale entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        self.inner.lock().await.purge_expired()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[async_trait]
impl CacheBackend for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.lock().await.get(key))
    }

    async fn peek(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.lock().await.peek(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner
            .lock()
            .await
            .set(key.to_string(), value.to_string());
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        self.inner.lock().await.invalidate(key);
        Ok(())
    }

    async fn stats(&self) -> Option<CacheStats> {
        Some(self.inner.lock().await.stats())
    }
}
