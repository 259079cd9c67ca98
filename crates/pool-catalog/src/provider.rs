//! Provider seams

use async_trait::async_trait;
use pool_model::{EntityMatch, PoolResult};
use std::sync::Arc;

/// Reference lists offered by the submission form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceList {
    /// National dex #1–807
    Pokemon,
    /// Learnable moves
    Moves,
    /// Abilities
    Abilities,
    /// Holdable items
    Items,
}

impl ReferenceList {
    /// Every list, in form order
    pub const ALL: [Self; 4] = [Self::Pokemon, Self::Moves, Self::Abilities, Self::Items];

    /// Key under which the list is cached
    #[inline]
    #[must_use]
    pub const fn cache_key(self) -> &'static str {
        match self {
            Self::Pokemon => "egg-pool-pokemon-gen7",
            Self::Moves => "egg-pool-moves-gen7",
            Self::Abilities => "egg-pool-abilities-gen7",
            Self::Items => "egg-pool-items-gen7",
        }
    }

    /// Human-readable label
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pokemon => "pokemon",
            Self::Moves => "moves",
            Self::Abilities => "abilities",
            Self::Items => "items",
        }
    }

    /// Parse a label (`pokemon`, `moves`, `abilities`, `items`)
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|list| list.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl std::fmt::Display for ReferenceList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Fetches display names for a reference list
#[async_trait]
pub trait ReferenceListProvider: Send + Sync {
    /// All display names of `list`
    async fn fetch_names(&self, list: ReferenceList) -> PoolResult<Vec<String>>;
}

/// Resolves free text to one canonical entity
///
/// A miss is `ErrorKind::NotFound`; any other failure is `ErrorKind::Transport`.
#[async_trait]
pub trait EntityLookup: Send + Sync {
    /// Look up a name or dex number
    async fn lookup(&self, query: &str) -> PoolResult<EntityMatch>;
}

#[async_trait]
impl<P: ReferenceListProvider + ?Sized> ReferenceListProvider for Arc<P> {
    async fn fetch_names(&self, list: ReferenceList) -> PoolResult<Vec<String>> {
        (**self).fetch_names(list).await
    }
}

#[async_trait]
impl<L: EntityLookup + ?Sized> EntityLookup for Arc<L> {
    async fn lookup(&self, query: &str) -> PoolResult<EntityMatch> {
        (**self).lookup(query).await
    }
}
