//! Egg Pool Model
//!
//! Value types shared by every layer of the egg pool.
//!
//! # Core Concepts
//!
//! - [`Record`]: One immutable submission, as persisted inside the document
//! - [`StoredRecord`]: A document element held verbatim, decoded on demand
//! - [`Document`]: Ordered sequence of records, encoded as a JSON array
//! - [`VersionToken`]: Opaque token handed out by the store on every read
//! - [`Snapshot`]: A document together with the token it was read at
//! - [`PoolError`]: Tagged error with an explicit [`ErrorKind`] discriminant
//!
//! # Example
//!
//! ```rust
//! use pool_model::{Document, EntityMatch, Record};
//!
//! let entity = EntityMatch::new(25, "pikachu", "https://img/25.png");
//! let record = Record::builder("Ash", &entity).nickname("Sparky").build();
//!
//! let document = Document::new().with_appended(record);
//! assert_eq!(document.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod document;
mod entity;
mod error;
mod names;
mod record;
mod stored;

// Re-exports
pub use document::{Document, Snapshot, VersionToken};
pub use entity::EntityMatch;
pub use error::{ErrorKind, PoolError, PoolResult};
pub use names::{capitalize, format_name, to_slug};
pub use record::{Record, RecordBuilder, RecordId};
pub use stored::StoredRecord;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the egg pool model
    pub use crate::{
        Document, EntityMatch, ErrorKind, PoolError, PoolResult, Record, RecordId, Snapshot,
        StoredRecord, VersionToken,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
