//! Cached reference lists

use crate::provider::{ReferenceList, ReferenceListProvider};
use pool_cache::{CacheMedium, Clock, SystemClock, TtlCache};
use pool_model::PoolResult;
use std::time::Duration;

/// How long a fetched reference list stays fresh (7 days)
pub const REFERENCE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Outcome of [`ReferenceCatalog::load_all`]; each list succeeds or fails on its own
#[derive(Debug, Clone)]
pub struct ReferenceLists {
    /// Pokémon names
    pub pokemon: PoolResult<Vec<String>>,
    /// Move names
    pub moves: PoolResult<Vec<String>>,
    /// Ability names
    pub abilities: PoolResult<Vec<String>>,
    /// Held-item names
    pub items: PoolResult<Vec<String>>,
}

impl ReferenceLists {
    /// Result for one list
    #[must_use]
    pub fn get(&self, list: ReferenceList) -> &PoolResult<Vec<String>> {
        match list {
            ReferenceList::Pokemon => &self.pokemon,
            ReferenceList::Moves => &self.moves,
            ReferenceList::Abilities => &self.abilities,
            ReferenceList::Items => &self.items,
        }
    }

    /// Names of `list`, or nothing when it failed to load
    #[must_use]
    pub fn names_or_empty(&self, list: ReferenceList) -> &[String] {
        self.get(list).as_deref().unwrap_or(&[])
    }
}

/// Reference lists fetched through a [`TtlCache`]
#[derive(Debug)]
pub struct ReferenceCatalog<P, M, C = SystemClock> {
    provider: P,
    cache: TtlCache<M, C>,
    ttl: Duration,
}

impl<P, M, C> ReferenceCatalog<P, M, C>
where
    P: ReferenceListProvider,
    M: CacheMedium,
    C: Clock,
{
    /// Catalog with the default 7-day TTL
    #[must_use]
    pub fn new(provider: P, cache: TtlCache<M, C>) -> Self {
        Self {
            provider,
            cache,
            ttl: REFERENCE_TTL,
        }
    }

    /// With a different freshness window
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Freshness window
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Underlying cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &TtlCache<M, C> {
        &self.cache
    }

    /// Names of `list`, from cache when fresh.
    ///
    /// # Errors
    /// The provider's error when the list had to be fetched and could not be.
    pub async fn load(&self, list: ReferenceList) -> PoolResult<Vec<String>> {
        let names = self
            .cache
            .get_or_fetch(list.cache_key(), self.ttl, || self.provider.fetch_names(list))
            .await?;
        tracing::info!(list = %list, count = names.len(), "Loaded reference list");
        Ok(names)
    }

    /// Load all four lists concurrently
    pub async fn load_all(&self) -> ReferenceLists {
        let (pokemon, moves, abilities, items) = futures::join!(
            self.load(ReferenceList::Pokemon),
            self.load(ReferenceList::Moves),
            self.load(ReferenceList::Abilities),
            self.load(ReferenceList::Items),
        );

        for (list, result) in [
            (ReferenceList::Pokemon, &pokemon),
            (ReferenceList::Moves, &moves),
            (ReferenceList::Abilities, &abilities),
            (ReferenceList::Items, &items),
        ] {
            if let Err(e) = result {
                tracing::warn!(list = %list, "Reference list unavailable: {}", e);
            }
        }

        ReferenceLists {
            pokemon,
            moves,
            abilities,
            items,
        }
    }
}
