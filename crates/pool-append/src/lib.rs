//! Egg Pool Append
//!
//! Adds one record to the shared document without losing concurrent
//! submissions. Every attempt reads a fresh document and token, appends to
//! that copy, and submits a conditional write; a version conflict means
//! someone else committed first, so the attempt is repeated after a pause.
//!
//! # Architecture
//!
//! ```text
//! Idle ──► Reading ──► Writing ──► Succeeded
//!            ▲            │
//!            │        Conflict (attempt < max)
//!            │            ▼
//!            └─────── Retrying (sleep base × attempt)
//!
//! any other error, or Conflict on the last attempt ──► Failed
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use pool_append::AppendCoordinator;
//!
//! let coordinator = AppendCoordinator::new(store);
//! let outcome = coordinator.append(record, "Add egg from ash (Pikachu)").await?;
//! println!("committed after {} attempt(s)", outcome.attempts);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod coordinator;

// Re-exports
pub use coordinator::{
    AppendCoordinator, AppendFailure, AppendOutcome, AppendPolicy, AppendState,
    DEFAULT_BACKOFF_BASE, DEFAULT_MAX_ATTEMPTS,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
