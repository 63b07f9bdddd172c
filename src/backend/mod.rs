//! Cache Backends
//!
//! The capability contract the coordinator is written against, and its two
//! production variants:
//! - [`LocalStore`]: in-process bounded TTL/LRU store, always available
//! - [`RemoteStore`]: Redis-backed store shared between service instances

mod local;
mod remote;

use async_trait::async_trait;

use crate::cache::CacheStats;
use crate::error::Result;

pub use local::LocalStore;
pub use remote::RemoteStore;

// == Cache Backend ==
/// A key-value store holding generated feed documents.
///
/// `get` reports absence as `Ok(None)`; `Err` is reserved for the backend
/// itself failing (connectivity, protocol, timeouts).
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short label used in logs and stats output.
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Like `get`, but leaves recency and hit/miss statistics untouched.
    ///
    /// Backends without local statistics fall back to `get`.
    async fn peek(&self, key: &str) -> Result<Option<String>> {
        self.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key` if present. Absence is not an error.
    async fn invalidate(&self, key: &str) -> Result<()>;

    /// Local statistics, when the backend keeps any.
    async fn stats(&self) -> Option<CacheStats> {
        None
    }
}
