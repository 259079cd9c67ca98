use async_trait::async_trait;
use parking_lot::Mutex;
use pool_catalog::{EntityLookup, ReferenceList, ReferenceListProvider};
use pool_model::{to_slug, EntityMatch, PoolError, PoolResult};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Lookup answering from a table keyed by slug; unknown slugs are `NotFound`.
#[derive(Debug, Default)]
pub struct ScriptedLookup {
    answers: Mutex<HashMap<String, PoolResult<EntityMatch>>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(self, entity: EntityMatch) -> Self {
        self.answers
            .lock()
            .insert(entity.name.clone(), Ok(entity));
        self
    }

    pub fn with_error(self, query: &str, error: PoolError) -> Self {
        self.answers.lock().insert(to_slug(query), Err(error));
        self
    }

    /// Answer for `query` only after `delay` (tokio time)
    pub fn with_delay(self, query: &str, delay: Duration) -> Self {
        self.delays.lock().insert(to_slug(query), delay);
        self
    }

    /// Slugs looked up so far, in call order
    pub fn queries(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(q, _)| q.clone()).collect()
    }

    /// Slugs with the tokio instant each call started at
    pub fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl EntityLookup for ScriptedLookup {
    async fn lookup(&self, query: &str) -> PoolResult<EntityMatch> {
        let slug = to_slug(query);
        self.calls.lock().push((slug.clone(), Instant::now()));

        let delay = self.delays.lock().get(&slug).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.answers
            .lock()
            .get(&slug)
            .cloned()
            .unwrap_or_else(|| Err(PoolError::not_found("Pokemon not found")))
    }
}

/// List provider answering from a mutable table; unset lists fail with `Transport`.
#[derive(Debug, Default)]
pub struct ScriptedLists {
    lists: Mutex<HashMap<ReferenceList, PoolResult<Vec<String>>>>,
    calls: Mutex<HashMap<ReferenceList, usize>>,
}

impl ScriptedLists {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(self, list: ReferenceList, names: &[&str]) -> Self {
        self.set(list, Ok(names.iter().map(|n| (*n).to_string()).collect()));
        self
    }

    pub fn set(&self, list: ReferenceList, result: PoolResult<Vec<String>>) {
        self.lists.lock().insert(list, result);
    }

    pub fn calls(&self, list: ReferenceList) -> usize {
        self.calls.lock().get(&list).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ReferenceListProvider for ScriptedLists {
    async fn fetch_names(&self, list: ReferenceList) -> PoolResult<Vec<String>> {
        *self.calls.lock().entry(list).or_insert(0) += 1;
        tokio::task::yield_now().await;

        self.lists
            .lock()
            .get(&list)
            .cloned()
            .unwrap_or_else(|| Err(PoolError::transport(format!("List fetch failed: {list}"))))
    }
}
