//! Egg Pool Cache
//!
//! Get-or-fetch-and-remember cache with expiry, used for the large reference
//! lists so a page visit does not reload them from the network.
//!
//! # Architecture
//!
//! ```text
//! get_or_fetch(key, ttl, fetch)
//!     │
//!     ├── medium.load(key) ── fresh {data, ts} ──► value
//!     │        │
//!     │        └── missing / expired / corrupt / medium down
//!     │
//!     └── fetch() ── Ok ──► medium.store(key, {data, ts: now}) ──► value
//!                 └─ Err ─► error (stored entry left as it was)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use pool_cache::{MemoryMedium, TtlCache};
//! use std::time::Duration;
//!
//! let cache = TtlCache::new(MemoryMedium::default());
//! let names: Vec<String> = cache
//!     .get_or_fetch("moves", Duration::from_secs(3600), || async { fetch_moves().await })
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod cache;
mod clock;
mod entry;
mod medium;

// Re-exports
pub use cache::TtlCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use medium::{CacheMedium, FileMedium, MediumError, MemoryMedium};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
