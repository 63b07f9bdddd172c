//! API Module
//!
//! HTTP handlers and routing for the cache administration API. The feed
//! endpoint itself belongs to the front end that embeds the coordinator.
//!
//! # Endpoints
//! - `GET /health` - Health check
//! - `GET /stats` - Cache statistics
//! - `GET /cache/key` - Derive the cache key for a feed query
//! - `DELETE /cache` - Invalidate by feed query
//! - `DELETE /cache/entries/:key` - Invalidate by raw key

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
