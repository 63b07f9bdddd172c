//! Request and Response models for the cache service
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! deserializing query strings and serializing HTTP response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{parse_flag, FeedDefaults, FeedParams, FeedQuery, DEFAULT_SECTION_LIMIT};
pub use responses::{HealthResponse, KeyResponse, StatsResponse, StoreStatsResponse};
