//! PokeAPI-backed providers

use crate::provider::{EntityLookup, ReferenceList, ReferenceListProvider};
use async_trait::async_trait;
use futures::future::join_all;
use pool_model::{format_name, to_slug, EntityMatch, ErrorKind, PoolError, PoolResult};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeSet;

/// Default PokeAPI base URL
const POKEAPI_URL: &str = "https://pokeapi.co/api/v2";

/// Sprite repository used when an entity has no default sprite
const SPRITE_FALLBACK_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// Item attributes whose union forms the held-item list
const HOLDABLE_ATTRIBUTES: [&str; 3] = ["holdable", "holdable-passive", "holdable-active"];

const USER_AGENT_VALUE: &str = concat!("egg-pool/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct NamedList {
    results: Vec<Named>,
}

#[derive(Debug, Deserialize)]
struct ItemAttribute {
    items: Vec<Named>,
}

#[derive(Debug, Deserialize)]
struct Sprites {
    front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PokemonBody {
    id: u32,
    name: String,
    sprites: Sprites,
}

impl PokemonBody {
    fn into_match(self) -> EntityMatch {
        let image_ref = self
            .sprites
            .front_default
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| format!("{SPRITE_FALLBACK_URL}/{}.png", self.id));
        EntityMatch::new(self.id, self.name, image_ref)
    }
}

/// Reference lists and entity lookup over the PokeAPI REST interface
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    client: reqwest::Client,
    base: Url,
}

impl PokeApiClient {
    /// Client for the public PokeAPI
    ///
    /// # Errors
    /// `Transport` if the HTTP client cannot be built
    pub fn new() -> PoolResult<Self> {
        Self::with_base(POKEAPI_URL)
    }

    /// Client for a PokeAPI-compatible server at `base`
    ///
    /// # Errors
    /// - `Validation` if `base` is not an absolute URL
    /// - `Transport` if the HTTP client cannot be built
    pub fn with_base(base: &str) -> PoolResult<Self> {
        let base = Url::parse(base.trim_end_matches('/'))
            .map_err(|e| PoolError::validation(format!("invalid PokeAPI base URL '{base}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(PoolError::validation(format!(
                "invalid PokeAPI base URL '{base}'"
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .build()
            .map_err(|e| PoolError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, base })
    }

    /// Base URL requests are resolved against
    #[inline]
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `base` extended with percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> PoolResult<T> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| PoolError::transport(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PoolError::not_found(format!("{url} not found")));
        }
        if !status.is_success() {
            return Err(PoolError::transport_status(
                status.as_u16(),
                format!("request to {url} failed: HTTP {}", status.as_u16()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| PoolError::transport(format!("malformed response from {url}: {e}")))
    }

    async fn fetch_named(&self, resource: &str, limit: u32) -> PoolResult<Vec<String>> {
        let mut url = self.endpoint(&[resource]);
        url.query_pairs_mut().append_pair("limit", &limit.to_string());

        let list: NamedList = self.get_json(url).await.map_err(|e| match e {
            // A missing list endpoint is an outage, not a lookup miss.
            PoolError::NotFound { message } => PoolError::transport_status(404, message),
            other => other,
        })?;
        Ok(list.results.iter().map(|r| format_name(&r.name)).collect())
    }

    async fn fetch_items(&self) -> PoolResult<Vec<String>> {
        let fetches = HOLDABLE_ATTRIBUTES.iter().map(|&attr| async move {
            let url = self.endpoint(&["item-attribute", attr, ""]);
            self.get_json::<ItemAttribute>(url)
                .await
                .map_err(|e| {
                    tracing::warn!(attribute = attr, "Item attribute fetch failed: {}", e);
                    e
                })
        });
        let results = join_all(fetches).await;

        if results.iter().all(Result::is_err) {
            return Err(PoolError::transport("List fetch failed: every item attribute"));
        }

        let names: BTreeSet<String> = results
            .into_iter()
            .flatten()
            .flat_map(|attribute| attribute.items)
            .map(|item| format_name(&item.name))
            .collect();
        Ok(names.into_iter().collect())
    }
}

#[async_trait]
impl ReferenceListProvider for PokeApiClient {
    async fn fetch_names(&self, list: ReferenceList) -> PoolResult<Vec<String>> {
        let names = match list {
            ReferenceList::Pokemon => self.fetch_named("pokemon", 807).await?,
            ReferenceList::Moves => self.fetch_named("move", 750).await?,
            ReferenceList::Abilities => self.fetch_named("ability", 250).await?,
            ReferenceList::Items => self.fetch_items().await?,
        };
        tracing::debug!(list = %list, count = names.len(), "Fetched reference list");
        Ok(names)
    }
}

#[async_trait]
impl EntityLookup for PokeApiClient {
    async fn lookup(&self, query: &str) -> PoolResult<EntityMatch> {
        let slug = to_slug(query);
        if slug.is_empty() {
            return Err(PoolError::not_found("Pokemon not found"));
        }

        let url = self.endpoint(&["pokemon", &slug]);
        match self.get_json::<PokemonBody>(url).await {
            Ok(body) => Ok(body.into_match()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(PoolError::not_found("Pokemon not found"))
            }
            Err(e) => Err(e),
        }
    }
}
