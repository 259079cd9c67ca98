//! Egg Pool Catalog
//!
//! Remote reference data: the large name lists that feed the search selects
//! and the single-entity lookup that confirms a typed Pokémon name.
//!
//! # Core Concepts
//!
//! - [`ReferenceList`]: Which list (Pokémon, moves, abilities, held items)
//! - [`ReferenceListProvider`]: Fetches one list of display names
//! - [`EntityLookup`]: Resolves free text to a canonical [`pool_model::EntityMatch`]
//! - [`PokeApiClient`]: Both providers over PokeAPI
//! - [`ReferenceCatalog`]: Lists loaded through a [`pool_cache::TtlCache`]

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod catalog;
mod pokeapi;
mod provider;

// Re-exports
pub use catalog::{ReferenceCatalog, ReferenceLists, REFERENCE_TTL};
pub use pokeapi::PokeApiClient;
pub use provider::{EntityLookup, ReferenceList, ReferenceListProvider};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
