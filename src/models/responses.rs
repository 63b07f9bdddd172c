//! Response DTOs for the cache service admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::coordinator::CoordinatorStats;

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status, always "OK" while the process serves requests
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "OK".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Per-backend section of the stats response.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<&CacheStats> for StoreStatsResponse {
    fn from(stats: &CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub populations: u64,
    pub primary_failures: u64,
    pub fallback_failures: u64,
    /// Absent when the primary keeps no local statistics (remote store)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<StoreStatsResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<StoreStatsResponse>,
}

impl From<CoordinatorStats> for StatsResponse {
    fn from(stats: CoordinatorStats) -> Self {
        Self {
            populations: stats.populations,
            primary_failures: stats.primary_failures,
            fallback_failures: stats.fallback_failures,
            primary: stats.primary.as_ref().map(StoreStatsResponse::from),
            fallback: stats.fallback.as_ref().map(StoreStatsResponse::from),
        }
    }
}

/// Response body for key derivation (GET /cache/key)
#[derive(Debug, Clone, Serialize)]
pub struct KeyResponse {
    pub key: String,
}
