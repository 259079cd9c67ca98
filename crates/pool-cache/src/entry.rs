//! Stored cache entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A cached value and the time it was fetched
///
/// Serialized as `{"data": <value>, "ts": <epoch millis>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Cached value
    #[serde(rename = "data")]
    pub value: T,
    /// Fetch time
    #[serde(rename = "ts", with = "chrono::serde::ts_milliseconds")]
    pub fetched_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Entry fetched at `fetched_at`
    #[inline]
    #[must_use]
    pub fn new(value: T, fetched_at: DateTime<Utc>) -> Self {
        Self { value, fetched_at }
    }

    /// Whether `now - fetched_at < ttl`.
    ///
    /// A `ttl` too large to represent never expires.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now.signed_duration_since(self.fetched_at) < ttl,
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn freshness_boundary_is_exclusive() {
        let entry = CacheEntry::new((), at(0));
        let ttl = Duration::from_millis(1000);
        assert!(entry.is_fresh(at(999), ttl));
        assert!(!entry.is_fresh(at(1000), ttl));
    }

    #[test]
    fn wire_shape() {
        let entry = CacheEntry::new(vec!["Bulbasaur"], at(1_700_000_000_000));
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"data":["Bulbasaur"],"ts":1700000000000}"#);
    }
}
