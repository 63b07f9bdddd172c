//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::models::{parse_flag, FeedDefaults};

/// Service configuration parameters, fixed for the life of the process.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum number of entries the local store can hold
    pub max_entries: usize,
    /// Lifetime in seconds of entries in the primary store
    pub cache_duration: u64,
    /// Lifetime in seconds of entries in the fallback store
    pub fallback_ttl: u64,
    /// Redis connection string; empty selects the in-process store as primary
    pub redis_url: String,
    /// Namespace prepended to every remote key
    pub redis_key_prefix: String,
    /// Bound in milliseconds on each primary store operation
    pub remote_timeout_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background sweep interval in seconds, 0 disables the sweep
    pub cleanup_interval: u64,
    /// Sections applied to feed requests that leave them out
    pub feed_defaults: FeedDefaults,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Local store capacity (default: 1000)
    /// - `CACHE_DURATION` - Primary TTL in seconds (default: 3600)
    /// - `FALLBACK_TTL` - Fallback TTL in seconds (default: `CACHE_DURATION`)
    /// - `REDIS_URL` - Remote store URL (default: empty, in-process only)
    /// - `REDIS_KEY_PREFIX` - Remote key namespace (default: "feed")
    /// - `REMOTE_TIMEOUT_MS` - Primary operation timeout (default: 500)
    /// - `PORT` - HTTP server port (default: 8000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 0, off)
    /// - `POSTS`, `REELS`, `STORIES`, `TAGGED` - Section flags (default: on)
    /// - `POSTS_LIMIT`, `REELS_LIMIT`, `TAGGED_LIMIT` - Section sizes (default: 12)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let cache_duration = parse_var("CACHE_DURATION", defaults.cache_duration);

        Self {
            max_entries: parse_var("MAX_ENTRIES", defaults.max_entries),
            cache_duration,
            fallback_ttl: parse_var("FALLBACK_TTL", cache_duration),
            redis_url: env::var("REDIS_URL").unwrap_or_default().trim().to_string(),
            redis_key_prefix: env::var("REDIS_KEY_PREFIX")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.redis_key_prefix),
            remote_timeout_ms: parse_var("REMOTE_TIMEOUT_MS", defaults.remote_timeout_ms),
            server_port: parse_var("PORT", defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL", defaults.cleanup_interval),
            feed_defaults: feed_defaults_from_env(defaults.feed_defaults),
        }
    }

    /// Whether a remote primary store is configured.
    pub fn uses_remote(&self) -> bool {
        !self.redis_url.is_empty()
    }

    pub fn primary_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_duration)
    }

    pub fn fallback_ttl(&self) -> Duration {
        Duration::from_secs(self.fallback_ttl)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    /// Sweep period, or None when the sweep is disabled.
    pub fn cleanup_interval(&self) -> Option<Duration> {
        (self.cleanup_interval > 0).then(|| Duration::from_secs(self.cleanup_interval))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            cache_duration: 3600,
            fallback_ttl: 3600,
            redis_url: String::new(),
            redis_key_prefix: "feed".to_string(),
            remote_timeout_ms: 500,
            server_port: 8000,
            cleanup_interval: 0,
            feed_defaults: FeedDefaults::default(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_flag_var(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

fn feed_defaults_from_env(defaults: FeedDefaults) -> FeedDefaults {
    FeedDefaults {
        posts: parse_flag_var("POSTS", defaults.posts),
        posts_limit: parse_var("POSTS_LIMIT", defaults.posts_limit),
        reels: parse_flag_var("REELS", defaults.reels),
        reels_limit: parse_var("REELS_LIMIT", defaults.reels_limit),
        stories: parse_flag_var("STORIES", defaults.stories),
        tagged: parse_flag_var("TAGGED", defaults.tagged),
        tagged_limit: parse_var("TAGGED_LIMIT", defaults.tagged_limit),
    }
}
