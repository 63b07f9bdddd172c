//! Redis-backed backend.
//!
//! Entries are written with `SETEX`, so Redis owns expiry. Capacity is left
//! to the server's own `maxmemory` policy.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tokio::sync::RwLock;
use tracing::debug;

use crate::backend::CacheBackend;
use crate::error::{CacheError, Result};

/// Remote store over a lazily opened multiplexed Redis connection.
#[derive(Clone)]
pub struct RemoteStore {
    client: Arc<Client>,
    key_prefix: Arc<str>,
    ttl: Duration,
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
}

impl Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self.connection.try_read() {
            Ok(conn) if conn.is_some() => "connected",
            Ok(_) => "no_connection",
            Err(_) => "busy",
        };

        f.debug_struct("RemoteStore")
            .field("key_prefix", &self.key_prefix)
            .field("ttl", &self.ttl)
            .field("connection", &status)
            .finish()
    }
}

impl RemoteStore {
    /// Validates `redis_url` without connecting; the first operation connects.
    pub fn new(redis_url: &str, key_prefix: &str, ttl: Duration) -> Result<Self> {
        let client = Client::open(redis_url)?;

        Ok(Self {
            client: Arc::new(client),
            key_prefix: Arc::from(key_prefix),
            ttl,
            connection: Arc::new(RwLock::new(None)),
        })
    }

    fn build_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        if let Some(conn) = self.connection.read().await.as_ref() {
            return Ok(conn.clone());
        }

        let mut slot = self.connection.write().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| CacheError::Unavailable(err.to_string()))?;
        debug!(prefix = %self.key_prefix, "opened redis connection");
        *slot = Some(conn.clone());
        Ok(conn)
    }

    /// Forgets a connection that just failed so the next call reconnects.
    async fn reset_on_error<T>(&self, result: redis::RedisResult<T>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                if err.is_io_error() || err.is_connection_dropped() {
                    self.connection.write().await.take();
                }
                Err(CacheError::Remote(err))
            }
        }
    }
}

#[async_trait]
impl CacheBackend for RemoteStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;
        let result: redis::RedisResult<Option<String>> = conn.get(self.build_key(key)).await;
        self.reset_on_error(result).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let seconds = self.ttl.as_secs();
        if seconds == 0 {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        let result: redis::RedisResult<()> = conn.set_ex(self.build_key(key), value, seconds).await;
        self.reset_on_error(result).await
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let result: redis::RedisResult<()> = conn.del(self.build_key(key)).await;
        self.reset_on_error(result).await
    }
}
