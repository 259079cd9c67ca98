use async_trait::async_trait;
use parking_lot::Mutex;
use pool_model::{Document, PoolResult, Snapshot, VersionToken};
use pool_store::{DocumentStore, WriteReceipt};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Store wrapper that lets a competing writer commit between a caller's read
/// and its write.
///
/// Each record queued with [`RacingStore::race_next_write`] is appended to the
/// inner store immediately before the next outer write is forwarded, so that
/// write carries a stale token.
pub struct RacingStore<S: DocumentStore> {
    inner: S,
    competitors: Mutex<VecDeque<S::Record>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl<S: DocumentStore> RacingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            competitors: Mutex::new(VecDeque::new()),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn race_next_write(&self, record: S::Record) {
        self.competitors.lock().push_back(record);
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Reads issued through this wrapper (competitor reads excluded)
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Writes issued through this wrapper (competitor writes excluded)
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for RacingStore<S> {
    type Record = S::Record;

    async fn read(&self) -> PoolResult<Snapshot<S::Record>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read().await
    }

    async fn write(
        &self,
        document: &Document<S::Record>,
        version: &VersionToken,
        description: &str,
    ) -> PoolResult<WriteReceipt> {
        self.writes.fetch_add(1, Ordering::SeqCst);

        let competitor = self.competitors.lock().pop_front();
        if let Some(record) = competitor {
            let snapshot = self.inner.read().await?;
            let raced = snapshot.document.with_appended(record);
            self.inner
                .write(&raced, &snapshot.version, "competing commit")
                .await?;
        }

        self.inner.write(document, version, description).await
    }
}
