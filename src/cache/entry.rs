//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and their liveness rule.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A single stored feed document with its insertion time.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: String,
    /// Instant of insertion or last refresh
    pub created_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current instant.
    pub fn new(value: String) -> Self {
        Self::with_created_at(value, Instant::now())
    }

    /// Creates an entry with an explicit creation instant.
    pub fn with_created_at(value: String, created_at: Instant) -> Self {
        Self { value, created_at }
    }

    // == Age ==
    /// Time elapsed since the entry was created or refreshed, as of `now`.
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    // == Is Expired ==
    /// Checks whether the entry is stale at `now` for the given `ttl`.
    ///
    /// Boundary condition: an entry whose age equals the TTL is already
    /// stale. Live means strictly `age < ttl`.
    pub fn is_expired_at(&self, now: Instant, ttl: Duration) -> bool {
        self.age_at(now) >= ttl
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_fresh_is_live() {
        let entry = CacheEntry::new("<feed/>".to_string());

        assert_eq!(entry.value, "<feed/>");
        assert!(!entry.is_expired_at(entry.created_at, Duration::from_secs(60)));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let ttl = Duration::from_secs(10);
        let entry = CacheEntry::with_created_at("v".to_string(), now);

        assert!(!entry.is_expired_at(now + Duration::from_millis(9_999), ttl));
        assert!(entry.is_expired_at(now + ttl, ttl), "age == ttl is stale");
        assert!(entry.is_expired_at(now + Duration::from_secs(11), ttl));
    }

    #[test]
    fn test_zero_ttl_is_always_expired() {
        let entry = CacheEntry::new("v".to_string());
        assert!(entry.is_expired_at(entry.created_at, Duration::ZERO));
    }

    #[test]
    fn test_age_never_negative() {
        let now = Instant::now();
        let entry = CacheEntry::with_created_at("v".to_string(), now + Duration::from_secs(5));
        assert_eq!(entry.age_at(now), Duration::ZERO);
    }
}
