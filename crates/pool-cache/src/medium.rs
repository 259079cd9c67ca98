//! Key-value media backing the cache
//!
//! A medium only moves opaque string blobs; parsing and expiry live in
//! [`crate::TtlCache`].

use async_trait::async_trait;
use moka::future::Cache;
use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Errors raised by a cache medium
#[derive(Debug, thiserror::Error)]
pub enum MediumError {
    /// IO failure on a file-backed medium
    #[error("io error on cache key '{key}': {source}")]
    Io {
        /// Cache key
        key: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Medium cannot be used at all
    #[error("cache medium unavailable: {0}")]
    Unavailable(String),
}

/// String-keyed blob storage
#[async_trait]
pub trait CacheMedium: Send + Sync {
    /// Blob stored under `key`, if any
    async fn load(&self, key: &str) -> Result<Option<String>, MediumError>;

    /// Replace the blob stored under `key`
    async fn store(&self, key: &str, blob: String) -> Result<(), MediumError>;

    /// Drop the blob stored under `key`
    async fn remove(&self, key: &str) -> Result<(), MediumError>;
}

#[async_trait]
impl<M: CacheMedium + ?Sized> CacheMedium for Box<M> {
    async fn load(&self, key: &str) -> Result<Option<String>, MediumError> {
        (**self).load(key).await
    }

    async fn store(&self, key: &str, blob: String) -> Result<(), MediumError> {
        (**self).store(key, blob).await
    }

    async fn remove(&self, key: &str) -> Result<(), MediumError> {
        (**self).remove(key).await
    }
}

/// One JSON file per key inside a directory
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader sees either the old blob or the new one.
#[derive(Debug, Clone)]
pub struct FileMedium {
    dir: PathBuf,
}

impl FileMedium {
    /// Medium rooted at `dir` (created on first write)
    #[inline]
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    ///
    /// `[A-Za-z0-9.-]` is kept and every other byte is written as `_XX` hex,
    /// so distinct keys never share a file.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-') {
                name.push(char::from(byte));
            } else {
                let _ = write!(name, "_{byte:02X}");
            }
        }
        self.dir.join(format!("{name}.json"))
    }
}

fn io_error(key: &str, source: std::io::Error) -> MediumError {
    MediumError::Io {
        key: key.to_string(),
        source,
    }
}

#[async_trait]
impl CacheMedium for FileMedium {
    async fn load(&self, key: &str) -> Result<Option<String>, MediumError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    async fn store(&self, key: &str, blob: String) -> Result<(), MediumError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(key, e))?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, blob.as_bytes())
            .await
            .map_err(|e| io_error(key, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(key, e))
    }

    async fn remove(&self, key: &str) -> Result<(), MediumError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

/// Process-local medium backed by moka
#[derive(Debug, Clone)]
pub struct MemoryMedium {
    inner: Cache<String, String>,
}

impl MemoryMedium {
    /// Medium holding at most `max_capacity` keys
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }
}

impl Default for MemoryMedium {
    /// Medium with room for 64 keys
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl CacheMedium for MemoryMedium {
    async fn load(&self, key: &str) -> Result<Option<String>, MediumError> {
        Ok(self.inner.get(key).await)
    }

    async fn store(&self, key: &str, blob: String) -> Result<(), MediumError> {
        self.inner.insert(key.to_string(), blob).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), MediumError> {
        self.inner.invalidate(key).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_for_escapes_keys() {
        let medium = FileMedium::new("/tmp/cache");
        assert_eq!(
            medium.path_for("egg-pool/moves gen7"),
            PathBuf::from("/tmp/cache/egg-pool_2Fmoves_20gen7.json")
        );
        assert_eq!(medium.path_for("v1.moves"), PathBuf::from("/tmp/cache/v1.moves.json"));
    }

    #[test]
    fn distinct_keys_get_distinct_files() {
        let medium = FileMedium::new("/tmp/cache");
        let keys = ["a/b", "a_b", "a b", "a_2Fb", "aéb", "a?b"];
        let paths: std::collections::HashSet<PathBuf> =
            keys.iter().map(|k| medium.path_for(k)).collect();
        assert_eq!(paths.len(), keys.len());
    }

    #[tokio::test]
    async fn keys_differing_only_in_punctuation_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let medium = FileMedium::new(dir.path());

        medium.store("lists/moves", "slash".to_string()).await.unwrap();
        medium.store("lists_moves", "underscore".to_string()).await.unwrap();

        assert_eq!(medium.load("lists/moves").await.unwrap().as_deref(), Some("slash"));
        assert_eq!(medium.load("lists_moves").await.unwrap().as_deref(), Some("underscore"));
    }

    #[tokio::test]
    async fn file_medium_roundtrip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let medium = FileMedium::new(dir.path().join("nested"));

        assert_eq!(medium.load("k").await.unwrap(), None);
        medium.store("k", "blob".to_string()).await.unwrap();
        assert_eq!(medium.load("k").await.unwrap().as_deref(), Some("blob"));

        medium.remove("k").await.unwrap();
        assert_eq!(medium.load("k").await.unwrap(), None);
        medium.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn memory_medium_roundtrip() {
        let medium = MemoryMedium::default();
        medium.store("k", "v".to_string()).await.unwrap();
        assert_eq!(medium.load("k").await.unwrap().as_deref(), Some("v"));
        medium.remove("k").await.unwrap();
        assert_eq!(medium.load("k").await.unwrap(), None);
    }
}
