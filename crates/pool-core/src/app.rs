//! Application facade wiring the production backends together

use crate::config::PoolConfig;
use crate::error::ConfigError;
use crate::gallery::Gallery;
use crate::submission::SubmissionService;
use pool_cache::{CacheMedium, FileMedium, MemoryMedium, TtlCache};
use pool_catalog::{
    EntityLookup, PokeApiClient, ReferenceCatalog, ReferenceList, ReferenceLists,
};
use pool_model::{EntityMatch, PoolResult, StoredRecord};
use pool_store::GitHubContentsStore;
use pool_ui::{DebouncedLookup, SearchSelect};
use std::fmt;
use std::sync::Arc;

/// Store holding the shared egg document, element by element as written
pub type PoolStore = GitHubContentsStore<StoredRecord>;

/// Catalog over PokeAPI with a medium chosen at startup
pub type PoolCatalog = ReferenceCatalog<Arc<PokeApiClient>, Box<dyn CacheMedium>>;

/// The egg pool, wired from a [`PoolConfig`]
pub struct EggPool {
    config: PoolConfig,
    store: Arc<PoolStore>,
    pokeapi: Arc<PokeApiClient>,
    catalog: PoolCatalog,
}

impl EggPool {
    /// Validate `config` and build the clients.
    ///
    /// # Errors
    /// - `ConfigError::Missing`/`Invalid` for unusable settings
    /// - `ConfigError::Client` when a client cannot be constructed
    pub fn from_config(config: PoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let store = Arc::new(GitHubContentsStore::new(config.github.clone())?);
        let pokeapi = Arc::new(PokeApiClient::with_base(&config.catalog.api_base)?);

        let medium: Box<dyn CacheMedium> = match &config.catalog.cache_dir {
            Some(dir) => {
                tracing::info!("Caching reference lists in {}", dir.display());
                Box::new(FileMedium::new(dir))
            }
            None => Box::new(MemoryMedium::default()),
        };
        let catalog = ReferenceCatalog::new(Arc::clone(&pokeapi), TtlCache::new(medium))
            .with_ttl(config.reference_ttl());

        tracing::info!(
            owner = %config.github.owner,
            repo = %config.github.repo,
            path = %config.github.path,
            "Egg pool ready"
        );

        Ok(Self {
            config,
            store,
            pokeapi,
            catalog,
        })
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Shared document store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<PoolStore> {
        &self.store
    }

    /// Reference catalog
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &PoolCatalog {
        &self.catalog
    }

    /// Current gallery, read fresh from the store.
    ///
    /// # Errors
    /// The store's read error.
    pub async fn gallery(&self) -> PoolResult<Gallery> {
        Gallery::load(&self.store).await
    }

    /// Submission service using the configured append policy
    #[must_use]
    pub fn submissions(&self) -> SubmissionService<Arc<PoolStore>> {
        SubmissionService::with_policy(Arc::clone(&self.store), self.config.append_policy())
    }

    /// Resolve one entity immediately, bypassing the debounce.
    ///
    /// # Errors
    /// `NotFound` for an unknown entity, `Transport` otherwise.
    pub async fn lookup(&self, query: &str) -> PoolResult<EntityMatch> {
        self.pokeapi.lookup(query).await
    }

    /// Free-text entity field with the configured quiet interval
    #[must_use]
    pub fn species_field(&self) -> DebouncedLookup<PokeApiClient> {
        DebouncedLookup::shared(Arc::clone(&self.pokeapi))
            .with_quiet_interval(self.config.quiet_interval())
    }

    /// One reference list, cached.
    ///
    /// # Errors
    /// The provider's error when the list had to be fetched and failed.
    pub async fn reference_list(&self, list: ReferenceList) -> PoolResult<Vec<String>> {
        self.catalog.load(list).await
    }

    /// All reference lists, cached; each may fail on its own
    pub async fn reference_lists(&self) -> ReferenceLists {
        self.catalog.load_all().await
    }

    /// Search select over `names` with the configured limits
    #[must_use]
    pub fn select_for(&self, names: Vec<String>) -> SearchSelect {
        SearchSelect::new(names)
            .with_max_results(self.config.form.max_results)
            .with_blur_grace(self.config.blur_grace())
    }
}

impl fmt::Debug for EggPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EggPool")
            .field("config", &self.config)
            .field("pokeapi", &self.pokeapi)
            .field("ttl", &self.catalog.ttl())
            .finish_non_exhaustive()
    }
}
