//! Feed Cache - bounded response cache for generated syndication feeds
//!
//! Memoizes feed documents by request parameters with TTL expiration, LRU
//! eviction, single-flight population and graceful backend degradation.

pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use backend::{CacheBackend, LocalStore, RemoteStore};
pub use config::Config;
pub use coordinator::{Coordinator, CoordinatorStats};
pub use models::{FeedDefaults, FeedParams, FeedQuery};
pub use tasks::spawn_cleanup_task;
