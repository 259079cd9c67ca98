//! Egg Pool Store
//!
//! Read-with-token / conditional-write access to the shared document.
//!
//! # Core Concepts
//!
//! - [`DocumentStore`]: The two-operation contract every backend implements
//! - [`GitHubContentsStore`]: Backend over the GitHub repository contents API
//! - [`MemoryStore`]: In-process backend with the same conflict semantics
//!
//! # Architecture
//!
//! ```text
//! read()  ──► GET  /repos/{owner}/{repo}/contents/{path}  ──► Snapshot { document, sha }
//! write() ──► PUT  /repos/{owner}/{repo}/contents/{path}  { message, content, sha, branch }
//!                 409 / 422 ──► PoolError::Conflict
//!                 other     ──► PoolError::Transport
//! ```
//!
//! The store never caches a token: every `read` goes to the backend.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod github;
mod memory;
mod store;
mod wire;

// Re-exports
pub use github::{GitHubContentsConfig, GitHubContentsStore};
pub use memory::MemoryStore;
pub use store::{DocumentStore, WriteReceipt};
pub use wire::{decode_content, encode_document};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
