//! Request DTOs for the cache service
//!
//! `FeedParams` is the raw query string. Resolved against the operator's
//! `FeedDefaults` it becomes a `FeedQuery`, which carries every parameter
//! that shapes a generated feed and derives the cache key for it.

use std::fmt::Write as _;

use serde::{Deserialize, Deserializer};

use crate::error::{CacheError, Result};

/// Default number of items fetched per enabled section.
pub const DEFAULT_SECTION_LIMIT: u32 = 12;

/// Bumped whenever the key layout changes, so old remote entries are ignored.
const KEY_VERSION: &str = "v1";

// == Feed Defaults ==
/// Section settings applied to whatever a request leaves out.
///
/// Operators set these through the environment (see `Config::from_env`), so
/// they decide which cache entry an unqualified request maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedDefaults {
    pub posts: bool,
    pub posts_limit: u32,
    pub reels: bool,
    pub reels_limit: u32,
    pub stories: bool,
    pub tagged: bool,
    pub tagged_limit: u32,
}

impl Default for FeedDefaults {
    fn default() -> Self {
        Self {
            posts: true,
            posts_limit: DEFAULT_SECTION_LIMIT,
            reels: true,
            reels_limit: DEFAULT_SECTION_LIMIT,
            stories: true,
            tagged: true,
            tagged_limit: DEFAULT_SECTION_LIMIT,
        }
    }
}

// == Feed Params ==
/// Feed request parameters, as received in a query string.
///
/// Flags accept `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off` and the
/// single letters `t`/`f`/`y`/`n`. Absent sections are filled in by
/// [`FeedParams::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedParams {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "optional_flag")]
    pub posts: Option<bool>,
    #[serde(default)]
    pub posts_limit: Option<u32>,
    #[serde(default, deserialize_with = "optional_flag")]
    pub reels: Option<bool>,
    #[serde(default)]
    pub reels_limit: Option<u32>,
    #[serde(default, deserialize_with = "optional_flag")]
    pub stories: Option<bool>,
    #[serde(default, deserialize_with = "optional_flag")]
    pub tagged: Option<bool>,
    #[serde(default)]
    pub tagged_limit: Option<u32>,
}

impl FeedParams {
    /// Builds the full query, taking every absent section from `defaults`.
    pub fn resolve(self, defaults: &FeedDefaults) -> FeedQuery {
        FeedQuery {
            user_id: self.user_id,
            username: self.username,
            posts: self.posts.unwrap_or(defaults.posts),
            posts_limit: self.posts_limit.unwrap_or(defaults.posts_limit),
            reels: self.reels.unwrap_or(defaults.reels),
            reels_limit: self.reels_limit.unwrap_or(defaults.reels_limit),
            stories: self.stories.unwrap_or(defaults.stories),
            tagged: self.tagged.unwrap_or(defaults.tagged),
            tagged_limit: self.tagged_limit.unwrap_or(defaults.tagged_limit),
        }
    }
}

// == Feed Query ==
/// A fully resolved feed request.
///
/// # Fields
/// - `user_id` / `username`: the account; at least one is required
/// - `posts`, `reels`, `tagged` with their `*_limit`: timeline sections
/// - `stories`: whether current stories are included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub posts: bool,
    pub posts_limit: u32,
    pub reels: bool,
    pub reels_limit: u32,
    pub stories: bool,
    pub tagged: bool,
    pub tagged_limit: u32,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self::defaults_from(&FeedDefaults::default())
    }
}

impl FeedQuery {
    /// A query with no account and every section taken from `defaults`.
    pub fn defaults_from(defaults: &FeedDefaults) -> Self {
        FeedParams::default().resolve(defaults)
    }

    /// Fills the account from a bare path target.
    ///
    /// A numeric target is a user id, anything else a username. Explicit
    /// query parameters win over the target.
    pub fn with_target(mut self, target: &str) -> Self {
        let target = target.trim();
        if target.is_empty() {
            return self;
        }
        if target.chars().all(|c| c.is_ascii_digit()) {
            self.user_id.get_or_insert_with(|| target.to_string());
        } else {
            self.username.get_or_insert_with(|| target.to_string());
        }
        self
    }

    /// Validates the query.
    pub fn validate(&self) -> Result<()> {
        if normalized(&self.user_id).is_none() && normalized(&self.username).is_none() {
            return Err(CacheError::InvalidRequest(
                "Please provide a username or user_id".to_string(),
            ));
        }
        Ok(())
    }

    // == Cache Key ==
    /// Deterministic cache key covering every content-affecting parameter.
    ///
    /// Usernames are case-insensitive upstream and are lowercased. Limits of
    /// disabled sections do not change the feed and are left out, so such
    /// requests share an entry.
    pub fn cache_key(&self) -> String {
        let mut key = String::with_capacity(96);
        key.push_str(KEY_VERSION);
        key.push_str("|user_id=");
        if let Some(user_id) = normalized(&self.user_id) {
            push_escaped(&mut key, user_id);
        }
        key.push_str("|username=");
        if let Some(username) = normalized(&self.username) {
            push_escaped(&mut key, &username.to_lowercase());
        }
        push_section(&mut key, "posts", self.posts, Some(self.posts_limit));
        push_section(&mut key, "reels", self.reels, Some(self.reels_limit));
        push_section(&mut key, "stories", self.stories, None);
        push_section(&mut key, "tagged", self.tagged, Some(self.tagged_limit));
        key
    }
}

fn normalized(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn push_section(key: &mut String, name: &str, enabled: bool, limit: Option<u32>) {
    let _ = match (enabled, limit) {
        (false, _) => write!(key, "|{}=0", name),
        (true, None) => write!(key, "|{}=1", name),
        (true, Some(limit)) => write!(key, "|{}=1:{}", name, limit),
    };
}

/// Escapes the key's own delimiters so identifiers cannot forge fields.
fn push_escaped(key: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '%' => key.push_str("%25"),
            '|' => key.push_str("%7C"),
            '=' => key.push_str("%3D"),
            _ => key.push(c),
        }
    }
}

/// Parses a boolean flag the way operators and query strings spell it.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn optional_flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_flag(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid flag value '{}'", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(user: &str) -> FeedQuery {
        FeedQuery::default().with_target(user)
    }

    fn params(json: &str) -> FeedParams {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults_when_absent() {
        let q = params(r#"{"username": "nasa"}"#).resolve(&FeedDefaults::default());
        assert_eq!(q, query("nasa"));
        assert!(q.posts && q.reels && q.stories && q.tagged);
        assert_eq!(q.posts_limit, DEFAULT_SECTION_LIMIT);
    }

    #[test]
    fn test_flag_spellings() {
        let p = params(
            r#"{"user_id": "1", "posts": "0", "reels": "off", "stories": "YES", "tagged": "f"}"#,
        );
        assert_eq!(p.posts, Some(false));
        assert_eq!(p.reels, Some(false));
        assert_eq!(p.stories, Some(true));
        assert_eq!(p.tagged, Some(false));

        let bad = serde_json::from_str::<FeedParams>(r#"{"user_id": "1", "posts": "maybe"}"#);
        assert!(bad.is_err());
        assert_eq!(parse_flag(" On "), Some(true));
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_operator_defaults_fill_absent_sections() {
        let defaults = FeedDefaults {
            posts: false,
            reels_limit: 4,
            ..FeedDefaults::default()
        };

        let q = params(r#"{"username": "nasa", "posts_limit": 30}"#).resolve(&defaults);
        assert!(!q.posts);
        assert_eq!(q.posts_limit, 30);
        assert_eq!(q.reels_limit, 4);
        assert!(q.stories);

        let explicit = params(r#"{"username": "nasa", "posts": "1"}"#).resolve(&defaults);
        assert!(explicit.posts, "explicit parameters win over defaults");
    }

    #[test]
    fn test_changed_default_changes_key() {
        let stock = FeedQuery::default().with_target("nasa");
        let custom = FeedQuery::defaults_from(&FeedDefaults {
            tagged_limit: 3,
            ..FeedDefaults::default()
        })
        .with_target("nasa");

        assert_ne!(stock.cache_key(), custom.cache_key());
        assert!(custom.cache_key().ends_with("|tagged=1:3"));
    }

    #[test]
    fn test_target_resolution() {
        assert_eq!(query("12345").user_id.as_deref(), Some("12345"));
        assert_eq!(query("nasa").username.as_deref(), Some("nasa"));

        let explicit = FeedQuery {
            username: Some("esa".to_string()),
            ..FeedQuery::default()
        }
        .with_target("nasa");
        assert_eq!(explicit.username.as_deref(), Some("esa"));
    }

    #[test]
    fn test_validate_requires_account() {
        assert!(FeedQuery::default().validate().is_err());
        assert!(query("   ").validate().is_err());
        assert!(query("nasa").validate().is_ok());
    }

    #[test]
    fn test_identical_requests_share_key() {
        assert_eq!(query("NASA").cache_key(), query(" nasa ").cache_key());
    }

    #[test]
    fn test_key_layout() {
        assert_eq!(
            query("42").cache_key(),
            "v1|user_id=42|username=|posts=1:12|reels=1:12|stories=1|tagged=1:12"
        );
    }

    #[test]
    fn test_every_content_parameter_changes_key() {
        let base = query("nasa");
        let variants = [
            FeedQuery { posts: false, ..base.clone() },
            FeedQuery { posts_limit: 5, ..base.clone() },
            FeedQuery { reels: false, ..base.clone() },
            FeedQuery { reels_limit: 5, ..base.clone() },
            FeedQuery { stories: false, ..base.clone() },
            FeedQuery { tagged: false, ..base.clone() },
            FeedQuery { tagged_limit: 5, ..base.clone() },
            FeedQuery { user_id: Some("1".to_string()), ..base.clone() },
            query("esa"),
        ];

        let mut keys: Vec<String> = variants.iter().map(FeedQuery::cache_key).collect();
        keys.push(base.cache_key());
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total, "two distinct requests collided");
    }

    #[test]
    fn test_disabled_section_limit_is_ignored() {
        let a = FeedQuery { reels: false, reels_limit: 3, ..query("nasa") };
        let b = FeedQuery { reels: false, reels_limit: 30, ..query("nasa") };
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_adjacent_fields_cannot_merge() {
        // reels_limit=1 + stories=true must differ from reels_limit=11 + stories=false.
        let a = FeedQuery { reels_limit: 1, stories: true, ..query("nasa") };
        let b = FeedQuery { reels_limit: 11, stories: false, ..query("nasa") };
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_identifiers_cannot_forge_fields() {
        let forged = query("x|posts=0");
        assert!(forged.cache_key().contains("username=x%7Cposts%3D0|"));
        assert_ne!(forged.cache_key(), query("x").cache_key());
    }
}
