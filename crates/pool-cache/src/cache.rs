//! Get-or-fetch cache with expiry

use crate::clock::{Clock, SystemClock};
use crate::entry::CacheEntry;
use crate::medium::CacheMedium;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

/// Time-boxed cache over a [`CacheMedium`]
///
/// # Contract
/// - a fresh entry is returned without calling the fetch function
/// - a failed fetch propagates its error and leaves the stored entry as it was
/// - a corrupt entry or an unavailable medium is a miss, never an error
#[derive(Debug, Clone)]
pub struct TtlCache<M, C = SystemClock> {
    medium: M,
    clock: C,
}

impl<M: CacheMedium> TtlCache<M> {
    /// Cache reading time from the system clock
    #[inline]
    #[must_use]
    pub fn new(medium: M) -> Self {
        Self::with_clock(medium, SystemClock)
    }
}

impl<M: CacheMedium, C: Clock> TtlCache<M, C> {
    /// Cache with an explicit clock
    #[inline]
    #[must_use]
    pub fn with_clock(medium: M, clock: C) -> Self {
        Self { medium, clock }
    }

    /// Underlying medium
    #[inline]
    #[must_use]
    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Return the cached value for `key` if younger than `ttl`, otherwise run
    /// `fetch` and remember its result.
    ///
    /// # Errors
    /// Whatever `fetch` returns.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(entry) = self.peek::<T>(key).await {
            if entry.is_fresh(self.clock.now(), ttl) {
                tracing::debug!(key, "Cache hit");
                return Ok(entry.value);
            }
            tracing::debug!(key, fetched_at = %entry.fetched_at, "Cache entry expired");
        }

        let value = fetch().await?;
        let entry = CacheEntry::new(value, self.clock.now());
        self.remember(key, &entry).await;
        Ok(entry.value)
    }

    /// Stored entry for `key` regardless of age.
    ///
    /// `None` when absent, unreadable or corrupt.
    pub async fn peek<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let blob = match self.medium.load(key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Cache medium unavailable, treating as miss: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&blob) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(key, "Corrupt cache entry treated as miss: {}", e);
                None
            }
        }
    }

    /// Drop the entry for `key`
    pub async fn invalidate(&self, key: &str) {
        if let Err(e) = self.medium.remove(key).await {
            tracing::warn!("Failed to invalidate cache entry: {}", e);
        }
    }

    async fn remember<T: Serialize>(&self, key: &str, entry: &CacheEntry<T>) {
        let blob = match serde_json::to_string(entry) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(key, "Failed to encode cache entry: {}", e);
                return;
            }
        };
        if let Err(e) = self.medium.store(key, blob).await {
            tracing::warn!("Failed to persist cache entry: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::medium::{MediumError, MemoryMedium};
    use async_trait::async_trait;
    use mockall::mock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    mock! {
        Medium {}

        #[async_trait]
        impl CacheMedium for Medium {
            async fn load(&self, key: &str) -> Result<Option<String>, MediumError>;
            async fn store(&self, key: &str, blob: String) -> Result<(), MediumError>;
            async fn remove(&self, key: &str) -> Result<(), MediumError>;
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn second_call_within_ttl_does_not_fetch() {
        let cache = TtlCache::with_clock(MemoryMedium::default(), ManualClock::default());
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Vec<String> = cache
                .get_or_fetch("moves", TTL, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(names(&["Tackle"]))
                })
                .await
                .unwrap();
            assert_eq!(value, names(&["Tackle"]));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entry_is_refetched() {
        let clock = ManualClock::default();
        let cache = TtlCache::with_clock(MemoryMedium::default(), clock.clone());

        let _: Vec<String> = cache
            .get_or_fetch("moves", TTL, || async { Ok::<_, String>(names(&["Tackle"])) })
            .await
            .unwrap();

        clock.advance(TTL);
        let value: Vec<String> = cache
            .get_or_fetch("moves", TTL, || async { Ok::<_, String>(names(&["Growl"])) })
            .await
            .unwrap();

        assert_eq!(value, names(&["Growl"]));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_stale_entry() {
        let clock = ManualClock::default();
        let cache = TtlCache::with_clock(MemoryMedium::default(), clock.clone());

        let _: Vec<String> = cache
            .get_or_fetch("moves", TTL, || async { Ok::<_, String>(names(&["Tackle"])) })
            .await
            .unwrap();
        let original = cache.peek::<Vec<String>>("moves").await.unwrap();

        clock.advance(TTL + Duration::from_secs(1));
        let err = cache
            .get_or_fetch::<Vec<String>, _, _, _>("moves", TTL, || async {
                Err("List fetch failed".to_string())
            })
            .await
            .unwrap_err();

        assert_eq!(err, "List fetch failed");
        assert_eq!(cache.peek::<Vec<String>>("moves").await, Some(original));
    }

    #[tokio::test]
    async fn corrupt_entry_triggers_refetch() {
        let medium = MemoryMedium::default();
        medium.store("moves", "{not json".to_string()).await.unwrap();
        let cache = TtlCache::with_clock(medium, ManualClock::default());

        let value: Vec<String> = cache
            .get_or_fetch("moves", TTL, || async { Ok::<_, String>(names(&["Ember"])) })
            .await
            .unwrap();

        assert_eq!(value, names(&["Ember"]));
        assert!(cache.peek::<Vec<String>>("moves").await.is_some());
    }

    #[tokio::test]
    async fn entry_of_wrong_shape_is_a_miss() {
        let medium = MemoryMedium::default();
        medium
            .store("moves", r#"{"data": 42, "ts": 0}"#.to_string())
            .await
            .unwrap();
        let cache = TtlCache::with_clock(medium, ManualClock::default());

        assert!(cache.peek::<Vec<String>>("moves").await.is_none());
    }

    #[tokio::test]
    async fn unavailable_medium_still_serves_fetched_value() {
        let mut medium = MockMedium::new();
        medium
            .expect_load()
            .returning(|_| Err(MediumError::Unavailable("quota exceeded".to_string())));
        medium
            .expect_store()
            .times(1)
            .returning(|_, _| Err(MediumError::Unavailable("quota exceeded".to_string())));
        let cache = TtlCache::with_clock(medium, ManualClock::default());

        let value: Vec<String> = cache
            .get_or_fetch("moves", TTL, || async { Ok::<_, String>(names(&["Surf"])) })
            .await
            .unwrap();

        assert_eq!(value, names(&["Surf"]));
    }
}
