//! Store contract

use async_trait::async_trait;
use pool_model::{Document, PoolResult, Snapshot, VersionToken};
use std::sync::Arc;

/// Outcome of a successful conditional write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Token of the new revision, when the backend reported one
    pub version: Option<VersionToken>,
}

impl WriteReceipt {
    /// Receipt carrying the new token
    #[inline]
    #[must_use]
    pub fn new(version: VersionToken) -> Self {
        Self {
            version: Some(version),
        }
    }

    /// Receipt for a backend that did not report the new token
    #[inline]
    #[must_use]
    pub fn unversioned() -> Self {
        Self { version: None }
    }
}

/// Versioned document store
///
/// # Contract
/// - `read` always reaches the backend; a token is never served from a
///   local cache
/// - `write` succeeds only when `version` equals the backend's current token;
///   otherwise it fails with `ErrorKind::Conflict` and the document is left
///   unchanged
/// - every other failure is `ErrorKind::Transport`
/// - each successful write creates exactly one durable revision
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Record type held by the document
    type Record: Clone + Send + Sync + 'static;

    /// Fetch the current document and its token
    async fn read(&self) -> PoolResult<Snapshot<Self::Record>>;

    /// Replace the document, conditional on `version` still being current
    async fn write(
        &self,
        document: &Document<Self::Record>,
        version: &VersionToken,
        description: &str,
    ) -> PoolResult<WriteReceipt>;
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for Arc<S> {
    type Record = S::Record;

    async fn read(&self) -> PoolResult<Snapshot<Self::Record>> {
        (**self).read().await
    }

    async fn write(
        &self,
        document: &Document<Self::Record>,
        version: &VersionToken,
        description: &str,
    ) -> PoolResult<WriteReceipt> {
        (**self).write(document, version, description).await
    }
}

#[async_trait]
impl<'a, S: DocumentStore> DocumentStore for &'a S {
    type Record = S::Record;

    async fn read(&self) -> PoolResult<Snapshot<Self::Record>> {
        (**self).read().await
    }

    async fn write(
        &self,
        document: &Document<Self::Record>,
        version: &VersionToken,
        description: &str,
    ) -> PoolResult<WriteReceipt> {
        (**self).write(document, version, description).await
    }
}
