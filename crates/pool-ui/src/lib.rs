//! Egg Pool UI
//!
//! Headless state machines behind the submission form's interactive fields.
//! Rendering is left to the front end; these types own the timing and
//! selection logic.
//!
//! # Core Concepts
//!
//! - [`DebouncedLookup`]: Validates free text against a remote lookup once
//!   typing pauses; later input always wins
//! - [`SearchSelect`]: Filters a large candidate list as the user types, with
//!   keyboard highlight and a blur grace period
//!
//! # Example
//!
//! ```rust,ignore
//! use pool_ui::{DebouncedLookup, SearchSelect};
//!
//! let species = DebouncedLookup::new(pokeapi);
//! species.on_input_change("pikachu");
//! let state = species.settled().await;
//!
//! let moves = SearchSelect::new(move_names);
//! moves.set_query("thunder");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod debounce;
mod select;

// Re-exports
pub use debounce::{DebouncedLookup, LookupState, DEFAULT_QUIET_INTERVAL};
pub use select::{Key, SearchSelect, DEFAULT_BLUR_GRACE, DEFAULT_MAX_RESULTS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
