//! API Handlers
//!
//! HTTP request handlers for the cache administration endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::backend::{LocalStore, RemoteStore};
use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::error::Result;
use crate::models::{FeedDefaults, FeedParams, HealthResponse, KeyResponse, StatsResponse};

/// Application state shared across all handlers.
///
/// Owns the coordinator explicitly; request handlers receive it through
/// axum state rather than a process-wide global.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Get-or-populate front of the cache
    pub coordinator: Arc<Coordinator>,
    /// The in-process store, whichever role it plays
    pub local: Arc<LocalStore>,
    /// Sections applied to feed requests that leave them out
    pub feed_defaults: FeedDefaults,
}

impl AppState {
    /// Creates a new AppState around an already built coordinator.
    pub fn new(coordinator: Arc<Coordinator>, local: Arc<LocalStore>) -> Self {
        Self {
            coordinator,
            local,
            feed_defaults: FeedDefaults::default(),
        }
    }

    /// Replaces the section defaults used to resolve feed requests.
    pub fn with_feed_defaults(mut self, feed_defaults: FeedDefaults) -> Self {
        self.feed_defaults = feed_defaults;
        self
    }

    /// Creates an AppState with a single in-process store.
    pub fn local_only(local: LocalStore) -> Self {
        let local = Arc::new(local);
        let coordinator = Coordinator::new(local.clone());
        Self::new(Arc::new(coordinator), local)
    }

    /// Creates a new AppState from configuration.
    ///
    /// With `REDIS_URL` set, Redis is the primary and the local store the
    /// fallback. Otherwise the local store is the only backend.
    pub fn from_config(config: &Config) -> Result<Self> {
        if !config.uses_remote() {
            let local = Arc::new(LocalStore::new(config.max_entries, config.primary_ttl()));
            let coordinator = Coordinator::new(local.clone()).with_timeout(config.remote_timeout());
            return Ok(Self::new(Arc::new(coordinator), local).with_feed_defaults(config.feed_defaults));
        }

        let remote = RemoteStore::new(
            &config.redis_url,
            &config.redis_key_prefix,
            config.primary_ttl(),
        )?;
        let local = Arc::new(LocalStore::new(config.max_entries, config.fallback_ttl()));
        let coordinator = Coordinator::new(Arc::new(remote))
            .with_fallback(local.clone())
            .with_timeout(config.remote_timeout());

        Ok(Self::new(Arc::new(coordinator), local).with_feed_defaults(config.feed_defaults))
    }
}

/// Handler for GET /cache/key
///
/// Returns the cache key a feed request with these parameters maps to.
pub async fn key_handler(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> Result<Json<KeyResponse>> {
    let query = params.resolve(&state.feed_defaults);
    query.validate()?;
    Ok(Json(KeyResponse {
        key: query.cache_key(),
    }))
}

/// Handler for DELETE /cache
///
/// Drops the cached feed for the request described by the query string.
pub async fn invalidate_query_handler(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> Result<StatusCode> {
    let query = params.resolve(&state.feed_defaults);
    query.validate()?;
    let key = query.cache_key();
    state.coordinator.invalidate(&key).await;
    info!(key = %key, "invalidated cached feed");
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for DELETE /cache/entries/:key
///
/// Drops a raw cache key. Absent keys are not an error.
pub async fn invalidate_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> StatusCode {
    state.coordinator.invalidate(&key).await;
    info!(key = %key, "invalidated cache key");
    StatusCode::NO_CONTENT
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.coordinator.stats().await.into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedQuery;
    use std::convert::Infallible;
    use std::time::Duration;

    fn test_state() -> AppState {
        AppState::local_only(LocalStore::new(100, Duration::from_secs(300)))
    }

    fn nasa() -> FeedParams {
        FeedParams {
            username: Some("nasa".to_string()),
            ..FeedParams::default()
        }
    }

    fn nasa_key() -> String {
        FeedQuery::default().with_target("nasa").cache_key()
    }

    #[tokio::test]
    async fn test_key_handler() {
        let response = key_handler(State(test_state()), Query(nasa())).await.unwrap();
        assert_eq!(response.key, nasa_key());
    }

    #[tokio::test]
    async fn test_key_handler_applies_state_defaults() {
        let defaults = FeedDefaults {
            stories: false,
            ..FeedDefaults::default()
        };
        let state = test_state().with_feed_defaults(defaults);

        let response = key_handler(State(state), Query(nasa())).await.unwrap();

        assert_ne!(response.key, nasa_key());
        assert_eq!(
            response.key,
            FeedQuery::defaults_from(&defaults).with_target("nasa").cache_key()
        );
    }

    #[tokio::test]
    async fn test_key_handler_rejects_missing_account() {
        let result = key_handler(State(test_state()), Query(FeedParams::default())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalidate_query_handler() {
        let state = test_state();
        let key = nasa_key();
        state
            .coordinator
            .get_or_populate(&key, || async { Ok::<_, Infallible>("<feed/>".to_string()) })
            .await
            .unwrap();

        let status = invalidate_query_handler(State(state.clone()), Query(nasa()))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(state.coordinator.get(&key).await, None);
    }

    #[tokio::test]
    async fn test_invalidate_key_handler_absent_key() {
        let status = invalidate_key_handler(State(test_state()), Path("missing".to_string())).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();
        state.coordinator.get("k").await;

        let response = stats_handler(State(state)).await;
        assert_eq!(response.populations, 0);
        assert_eq!(response.primary.as_ref().unwrap().misses, 1);
        assert!(response.fallback.is_none());
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "OK");
    }

    #[tokio::test]
    async fn test_from_config_local_only() {
        let state = AppState::from_config(&Config::default()).unwrap();
        let stats = state.coordinator.stats().await;
        assert!(stats.primary.is_some());
        assert!(stats.fallback.is_none());
    }

    #[tokio::test]
    async fn test_from_config_remote_primary() {
        let config = Config {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            ..Config::default()
        };
        let state = AppState::from_config(&config).unwrap();
        let stats = state.coordinator.stats().await;
        assert!(stats.primary.is_none(), "remote primary keeps no local stats");
        assert!(stats.fallback.is_some());
    }

    #[test]
    fn test_from_config_carries_feed_defaults() {
        let config = Config {
            feed_defaults: FeedDefaults {
                posts_limit: 3,
                ..FeedDefaults::default()
            },
            ..Config::default()
        };
        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.feed_defaults.posts_limit, 3);
    }

    #[test]
    fn test_from_config_rejects_bad_redis_url() {
        let config = Config {
            redis_url: "definitely not a url".to_string(),
            ..Config::default()
        };
        assert!(AppState::from_config(&config).is_err());
    }
}
