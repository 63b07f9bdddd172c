//! Cache Coordinator
//!
//! "Compute if absent" over a primary backend with an optional in-process
//! fallback. The cache is a pure performance optimization: backend failures
//! are logged and absorbed, so the worst case is every request paying the
//! full populate cost. Only populate errors reach the caller.

mod flight;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::backend::CacheBackend;
use crate::cache::CacheStats;
use crate::error::{CacheError, Result};
use flight::FlightGroup;

/// Default bound on a single backend operation.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_millis(500);

// == Coordinator Stats ==
/// Snapshot of coordinator counters and per-backend statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoordinatorStats {
    /// Times `populate` was actually invoked
    pub populations: u64,
    /// Primary backend operations that errored or timed out
    pub primary_failures: u64,
    /// Fallback backend operations that errored or timed out
    pub fallback_failures: u64,
    pub primary: Option<CacheStats>,
    pub fallback: Option<CacheStats>,
}

#[derive(Debug, Default)]
struct Counters {
    populations: AtomicU64,
    primary_failures: AtomicU64,
    fallback_failures: AtomicU64,
}

/// How a read treats backend statistics.
#[derive(Debug, Clone, Copy)]
enum Lookup {
    /// Counted read that promotes the entry
    Get,
    /// Uncounted read
    Peek,
}

impl Lookup {
    async fn run(self, backend: &dyn CacheBackend, key: &str) -> Result<Option<String>> {
        match self {
            Lookup::Get => backend.get(key).await,
            Lookup::Peek => backend.peek(key).await,
        }
    }
}

// == Coordinator ==
/// Get-or-populate front of the feed cache.
pub struct Coordinator {
    primary: Arc<dyn CacheBackend>,
    fallback: Option<Arc<dyn CacheBackend>>,
    timeout: Duration,
    flights: FlightGroup,
    counters: Counters,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("primary", &self.primary.name())
            .field("fallback", &self.fallback.as_ref().map(|b| b.name()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Coordinator {
    // == Constructor ==
    /// Creates a coordinator over `primary` with no fallback.
    pub fn new(primary: Arc<dyn CacheBackend>) -> Self {
        Self {
            primary,
            fallback: None,
            timeout: DEFAULT_BACKEND_TIMEOUT,
            flights: FlightGroup::new(),
            counters: Counters::default(),
        }
    }

    /// Retries failed primary operations against `fallback`.
    pub fn with_fallback(mut self, fallback: Arc<dyn CacheBackend>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Bounds every backend operation by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    // == Get Or Populate ==
    /// Returns the cached value for `key`, or populates and caches it.
    pub async fn get_or_populate<F, Fut, E>(
        &self,
        key: &str,
        populate: F,
    ) -> std::result::Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<String, E>>,
    {
        self.get_or_populate_with(key, populate, true).await
    }

    /// Returns the cached value for `key`, or invokes `populate`.
    ///
    /// With `store_result == false` the fresh value is returned but never
    /// written, and the call runs outside the key's flight so its result is
    /// never handed to other callers.
    ///
    /// Concurrent storing callers missing on the same key share a single
    /// `populate` invocation and all receive its value. A populate error goes
    /// to the caller whose closure produced it; a waiting caller then retries
    /// with its own closure.
    pub async fn get_or_populate_with<F, Fut, E>(
        &self,
        key: &str,
        populate: F,
        store_result: bool,
    ) -> std::result::Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<String, E>>,
    {
        if let Some(value) = self.get(key).await {
            debug!(key, "cache hit");
            return Ok(value);
        }

        if !store_result {
            debug!(key, "cache miss, populating without storing");
            self.counters.populations.fetch_add(1, Ordering::Relaxed);
            return populate().await;
        }

        let flight = self.flights.join(key);
        let value = flight
            .cell()
            .get_or_try_init(|| async {
                // A flight that finished between our miss and joining has
                // already stored its value. The miss above is already counted.
                if let Some(value) = self.lookup(key, Lookup::Peek).await {
                    return Ok(value);
                }
                debug!(key, "cache miss, populating");
                self.counters.populations.fetch_add(1, Ordering::Relaxed);
                let value = populate().await?;
                self.set(key, &value).await;
                Ok::<_, E>(value)
            })
            .await?
            .clone();

        Ok(value)
    }

    // == Get ==
    /// Looks `key` up, degrading to the fallback and then to a miss.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.lookup(key, Lookup::Get).await
    }

    async fn lookup(&self, key: &str, mode: Lookup) -> Option<String> {
        let err = match self.bounded(mode.run(self.primary.as_ref(), key)).await {
            Ok(value) => return value,
            Err(err) => err,
        };
        self.counters.primary_failures.fetch_add(1, Ordering::Relaxed);

        let Some(fallback) = &self.fallback else {
            error!(key, backend = self.primary.name(), error = %err, "cache get failed, treating as miss");
            return None;
        };
        warn!(key, backend = self.primary.name(), error = %err, "primary cache get failed, using fallback");

        match self.bounded(mode.run(fallback.as_ref(), key)).await {
            Ok(value) => value,
            Err(err) => {
                self.counters.fallback_failures.fetch_add(1, Ordering::Relaxed);
                error!(key, backend = fallback.name(), error = %err, "fallback cache get failed, treating as miss");
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key`, degrading to the fallback and then to a no-op.
    pub async fn set(&self, key: &str, value: &str) {
        let err = match self.bounded(self.primary.set(key, value)).await {
            Ok(()) => return,
            Err(err) => err,
        };
        self.counters.primary_failures.fetch_add(1, Ordering::Relaxed);

        let Some(fallback) = &self.fallback else {
            error!(key, backend = self.primary.name(), error = %err, "cache set failed, value not cached");
            return;
        };
        warn!(key, backend = self.primary.name(), error = %err, "primary cache set failed, using fallback");

        if let Err(err) = self.bounded(fallback.set(key, value)).await {
            self.counters.fallback_failures.fetch_add(1, Ordering::Relaxed);
            error!(key, backend = fallback.name(), error = %err, "fallback cache set failed, value not cached");
        }
    }

    // == Invalidate ==
    /// Removes `key` from every backend. Failures are logged only.
    pub async fn invalidate(&self, key: &str) {
        if let Err(err) = self.bounded(self.primary.invalidate(key)).await {
            self.counters.primary_failures.fetch_add(1, Ordering::Relaxed);
            warn!(key, backend = self.primary.name(), error = %err, "cache invalidate failed");
        }
        if let Some(fallback) = &self.fallback {
            if let Err(err) = self.bounded(fallback.invalidate(key)).await {
                self.counters.fallback_failures.fetch_add(1, Ordering::Relaxed);
                warn!(key, backend = fallback.name(), error = %err, "cache invalidate failed");
            }
        }
    }

    // == Stats ==
    pub async fn stats(&self) -> CoordinatorStats {
        let fallback = match &self.fallback {
            Some(fallback) => fallback.stats().await,
            None => None,
        };

        CoordinatorStats {
            populations: self.counters.populations.load(Ordering::Relaxed),
            primary_failures: self.counters.primary_failures.load(Ordering::Relaxed),
            fallback_failures: self.counters.fallback_failures.load(Ordering::Relaxed),
            primary: self.primary.stats().await,
            fallback,
        }
    }

    async fn bounded<T>(&self, operation: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}
