use pool_cache::{FileMedium, ManualClock, MemoryMedium, TtlCache};
use pool_catalog::{ReferenceCatalog, ReferenceList, REFERENCE_TTL};
use pool_model::{ErrorKind, PoolError};
use pool_test_utils::ScriptedLists;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn lists() -> Arc<ScriptedLists> {
    Arc::new(
        ScriptedLists::new()
            .with_list(ReferenceList::Pokemon, &["Bulbasaur", "Ivysaur"])
            .with_list(ReferenceList::Moves, &["Tackle", "Vine Whip"])
            .with_list(ReferenceList::Abilities, &["Overgrow"])
            .with_list(ReferenceList::Items, &["Leftovers"]),
    )
}

#[tokio::test]
async fn test_second_load_is_served_from_cache() {
    let provider = lists();
    let catalog = ReferenceCatalog::new(
        Arc::clone(&provider),
        TtlCache::with_clock(MemoryMedium::default(), ManualClock::default()),
    );

    let first = catalog.load(ReferenceList::Moves).await.unwrap();
    let second = catalog.load(ReferenceList::Moves).await.unwrap();

    assert_eq!(first, vec!["Tackle", "Vine Whip"]);
    assert_eq!(first, second);
    assert_eq!(provider.calls(ReferenceList::Moves), 1);
}

#[tokio::test]
async fn test_list_is_refetched_after_a_week() {
    let provider = lists();
    let clock = ManualClock::default();
    let catalog = ReferenceCatalog::new(
        Arc::clone(&provider),
        TtlCache::with_clock(MemoryMedium::default(), clock.clone()),
    );

    catalog.load(ReferenceList::Abilities).await.unwrap();
    clock.advance(REFERENCE_TTL - Duration::from_secs(1));
    catalog.load(ReferenceList::Abilities).await.unwrap();
    assert_eq!(provider.calls(ReferenceList::Abilities), 1);

    provider.set(ReferenceList::Abilities, Ok(vec!["Chlorophyll".to_string()]));
    clock.advance(Duration::from_secs(1));
    let refreshed = catalog.load(ReferenceList::Abilities).await.unwrap();

    assert_eq!(refreshed, vec!["Chlorophyll"]);
    assert_eq!(provider.calls(ReferenceList::Abilities), 2);
}

#[tokio::test]
async fn test_cache_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::default();

    let provider = lists();
    let catalog = ReferenceCatalog::new(
        Arc::clone(&provider),
        TtlCache::with_clock(FileMedium::new(dir.path()), clock.clone()),
    );
    catalog.load(ReferenceList::Pokemon).await.unwrap();
    drop(catalog);

    let restarted_provider = lists();
    let restarted = ReferenceCatalog::new(
        Arc::clone(&restarted_provider),
        TtlCache::with_clock(FileMedium::new(dir.path()), clock),
    );
    let names = restarted.load(ReferenceList::Pokemon).await.unwrap();

    assert_eq!(names, vec!["Bulbasaur", "Ivysaur"]);
    assert_eq!(restarted_provider.calls(ReferenceList::Pokemon), 0);
}

#[tokio::test]
async fn test_load_all_reports_each_list_independently() {
    let provider = lists();
    provider.set(
        ReferenceList::Items,
        Err(PoolError::transport("List fetch failed: items")),
    );
    let catalog = ReferenceCatalog::new(
        Arc::clone(&provider),
        TtlCache::with_clock(MemoryMedium::default(), ManualClock::default()),
    );

    let loaded = catalog.load_all().await;

    assert_eq!(loaded.names_or_empty(ReferenceList::Pokemon), ["Bulbasaur", "Ivysaur"]);
    assert_eq!(loaded.names_or_empty(ReferenceList::Moves), ["Tackle", "Vine Whip"]);
    assert_eq!(loaded.names_or_empty(ReferenceList::Abilities), ["Overgrow"]);
    assert!(loaded.names_or_empty(ReferenceList::Items).is_empty());
    assert_eq!(
        loaded.get(ReferenceList::Items).as_ref().unwrap_err().kind(),
        ErrorKind::Transport
    );
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let provider = lists();
    provider.set(ReferenceList::Moves, Err(PoolError::transport("offline")));
    let catalog = ReferenceCatalog::new(
        Arc::clone(&provider),
        TtlCache::with_clock(MemoryMedium::default(), ManualClock::default()),
    );

    assert!(catalog.load(ReferenceList::Moves).await.is_err());

    provider.set(ReferenceList::Moves, Ok(vec!["Tackle".to_string()]));
    assert_eq!(catalog.load(ReferenceList::Moves).await.unwrap(), vec!["Tackle"]);
    assert_eq!(provider.calls(ReferenceList::Moves), 2);
}
