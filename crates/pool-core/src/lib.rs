//! Egg Pool Core
//!
//! Workflows of the egg pool: load configuration, browse the gallery, and
//! submit new eggs while other trainers do the same.
//!
//! # Core Concepts
//!
//! - [`PoolConfig`]: TOML configuration with environment overrides
//! - [`SubmissionService`]: Validates a [`SubmissionForm`] and appends the
//!   resulting record under optimistic concurrency
//! - [`Gallery`]: Every record, newest first
//! - [`EggPool`]: Facade wiring the GitHub store, PokeAPI, and the reference
//!   cache from one config
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │                     EggPool                        │
//! │  ┌────────────┐  ┌─────────────┐  ┌─────────────┐  │
//! │  │  Gallery   │  │ Submission  │  │  Reference  │  │
//! │  │            │  │  Service    │  │  Catalog    │  │
//! │  └─────┬──────┘  └──────┬──────┘  └──────┬──────┘  │
//! │        │                │                │         │
//! │        │         AppendCoordinator    TtlCache     │
//! │        │                │                │         │
//! │        └────────┬───────┘           PokeApiClient  │
//! │           DocumentStore                            │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use pool_core::{EggPool, PoolConfig, SubmissionForm};
//!
//! let config = PoolConfig::load("egg-pool.toml")?.with_env_overrides();
//! let pool = EggPool::from_config(config)?;
//!
//! let entity = pool.lookup("pikachu").await?;
//! let form = SubmissionForm::new("Ash").with_nickname("Sparky");
//! let receipt = pool.submissions().submit(&form, Some(&entity)).await?;
//! println!("{}", receipt.detail());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod app;
mod config;
mod error;
mod gallery;
mod submission;

// Re-exports
pub use app::{EggPool, PoolCatalog, PoolStore};
pub use config::{AppendConfig, CatalogConfig, FormConfig, PoolConfig, TOKEN_ENV};
pub use error::{ConfigError, SubmissionError};
pub use gallery::{EggCard, Gallery};
pub use submission::{
    commit_message, progress_label, SubmissionForm, SubmissionReceipt, SubmissionService,
    MAX_MOVES, SUBMIT_LABEL,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
