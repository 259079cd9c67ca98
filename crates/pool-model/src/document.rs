//! Versioned documents
//!
//! The shared document is a plain JSON array. Version tokens are opaque: the
//! store mints them, clients only hand them back.

use serde::{Deserialize, Serialize};

/// Opaque version token (a blob sha for the GitHub store)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    /// Wrap a token string
    #[inline]
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 7 characters, for log lines
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for VersionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered sequence of records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document<R> {
    records: Vec<R>,
}

impl<R> Document<R> {
    /// Empty document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Document holding the given records in order
    #[inline]
    #[must_use]
    pub fn from_records(records: Vec<R>) -> Self {
        Self { records }
    }

    /// Records, oldest first
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Records, newest first
    pub fn newest_first(&self) -> impl Iterator<Item = &R> {
        self.records.iter().rev()
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the document holds no records
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append in place
    #[inline]
    pub fn push(&mut self, record: R) {
        self.records.push(record);
    }

    /// Consume into the record vector
    #[inline]
    #[must_use]
    pub fn into_records(self) -> Vec<R> {
        self.records
    }
}

impl<R: Clone> Document<R> {
    /// Copy of this document with one record appended
    #[must_use]
    pub fn with_appended(&self, record: R) -> Self {
        let mut next = self.clone();
        next.push(record);
        next
    }
}

impl<R> Default for Document<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// A document together with the token it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<R> {
    /// Document content
    pub document: Document<R>,
    /// Token required by the next conditional write
    pub version: VersionToken,
}

impl<R> Snapshot<R> {
    /// Pair a document with its token
    #[inline]
    #[must_use]
    pub fn new(document: Document<R>, version: VersionToken) -> Self {
        Self { document, version }
    }
}
