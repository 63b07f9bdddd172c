//! API Routes
//!
//! Configures the Axum router with all cache administration endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    health_handler, invalidate_key_handler, invalidate_query_handler, key_handler,
    stats_handler, AppState,
};

/// Creates the admin router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check
/// - `GET /stats` - Coordinator and store statistics
/// - `GET /cache/key` - Cache key for a feed query string
/// - `DELETE /cache` - Invalidate the feed for a query string
/// - `DELETE /cache/entries/:key` - Invalidate a raw cache key
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/cache", delete(invalidate_query_handler))
        .route("/cache/key", get(key_handler))
        .route("/cache/entries/:key", delete(invalidate_key_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
