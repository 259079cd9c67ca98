//! In-process backend
//!
//! Same conditional-write contract as the GitHub backend, with monotonic
//! `v<N>` tokens. Every call yields once before touching state so concurrent
//! callers interleave the way network round-trips would.

use crate::store::{DocumentStore, WriteReceipt};
use async_trait::async_trait;
use parking_lot::Mutex;
use pool_model::{Document, PoolError, PoolResult, Snapshot, VersionToken};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
struct MemoryState<R> {
    document: Document<R>,
    revision: u64,
    commits: Vec<String>,
}

impl<R> MemoryState<R> {
    fn token(&self) -> VersionToken {
        VersionToken::new(format!("v{}", self.revision))
    }
}

/// Document store held in memory
#[derive(Debug)]
pub struct MemoryStore<R> {
    state: Mutex<MemoryState<R>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl<R: Clone> MemoryStore<R> {
    /// Empty store at revision 0
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    /// Store seeded with a document at revision 0
    #[must_use]
    pub fn with_document(document: Document<R>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                document,
                revision: 0,
                commits: Vec::new(),
            }),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Current document, bypassing the read counter
    #[must_use]
    pub fn document(&self) -> Document<R> {
        self.state.lock().document.clone()
    }

    /// Current token
    #[must_use]
    pub fn version(&self) -> VersionToken {
        self.state.lock().token()
    }

    /// Commit messages of successful writes, oldest first
    #[must_use]
    pub fn commit_messages(&self) -> Vec<String> {
        self.state.lock().commits.clone()
    }

    /// Number of `read` calls
    #[inline]
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `write` calls, including rejected ones
    #[inline]
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl<R: Clone> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R> DocumentStore for MemoryStore<R>
where
    R: Clone + Send + Sync + 'static,
{
    type Record = R;

    async fn read(&self) -> PoolResult<Snapshot<R>> {
        tokio::task::yield_now().await;
        self.reads.fetch_add(1, Ordering::SeqCst);

        let state = self.state.lock();
        Ok(Snapshot::new(state.document.clone(), state.token()))
    }

    async fn write(
        &self,
        document: &Document<R>,
        version: &VersionToken,
        description: &str,
    ) -> PoolResult<WriteReceipt> {
        tokio::task::yield_now().await;
        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock();
        let current = state.token();
        if *version != current {
            return Err(PoolError::conflict(
                409,
                format!("document is at {current} but expected {version}"),
            ));
        }

        state.document = document.clone();
        state.revision += 1;
        state.commits.push(description.to_string());
        Ok(WriteReceipt::new(state.token()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pool_model::ErrorKind;

    #[tokio::test]
    async fn write_with_current_token_advances_revision() {
        let store = MemoryStore::<u32>::new();
        let snapshot = store.read().await.unwrap();

        let receipt = store
            .write(&snapshot.document.with_appended(7), &snapshot.version, "add 7")
            .await
            .unwrap();

        assert_eq!(receipt.version, Some(VersionToken::new("v1")));
        assert_eq!(store.document().records(), &[7]);
        assert_eq!(store.commit_messages(), vec!["add 7".to_string()]);
    }

    #[tokio::test]
    async fn stale_token_leaves_document_unchanged() {
        let store = MemoryStore::with_document(Document::from_records(vec![1u32]));
        let stale = store.read().await.unwrap();
        store
            .write(&stale.document.with_appended(2), &stale.version, "first")
            .await
            .unwrap();

        let before = store.document();
        let err = store
            .write(&stale.document.with_appended(3), &stale.version, "second")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(store.document(), before);
        assert_eq!(store.write_count(), 2);
    }
}
