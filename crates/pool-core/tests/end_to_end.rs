use pool_core::{progress_label, EggPool, PoolConfig, SubmissionError, SubmissionForm};
use pool_model::ErrorKind;
use pool_test_utils::{foreign_record_json, record_json, sample_record, FakeContentsApi, FakePokeApi};
use pretty_assertions::assert_eq;
use serde_json::json;

fn pool_for(github: &FakeContentsApi, pokeapi: &FakePokeApi) -> EggPool {
    let config = PoolConfig::new()
        .with_github(github.config())
        .with_catalog_api(pokeapi.base_url());
    EggPool::from_config(config).unwrap()
}

fn fast(config: PoolConfig) -> PoolConfig {
    let mut config = config;
    config.append.backoff_base_ms = 10;
    config
}

#[tokio::test]
async fn test_lookup_then_submit_then_gallery() {
    let github = FakeContentsApi::with_records(vec![record_json(&sample_record("Misty"))]);
    let pokeapi = FakePokeApi::start().with_pokemon(25, "pikachu", None);
    let pool = pool_for(&github, &pokeapi);

    let entity = pool.lookup("Pikachu").await.unwrap();
    let form = SubmissionForm::new("Ash")
        .with_nickname("Sparky")
        .with_moves(["Thunderbolt", ""]);
    let receipt = pool.submissions().submit(&form, Some(&entity)).await.unwrap();

    assert_eq!(receipt.outcome.attempts, 1);
    assert_eq!(receipt.outcome.document_len, 2);
    assert_eq!(
        receipt.detail(),
        "Pikachu (nicknamed \"Sparky\") from Ash has been added to the egg pool."
    );
    assert_eq!(github.commit_messages(), vec!["Add egg from Ash (Pikachu)"]);

    let gallery = pool.gallery().await.unwrap();
    assert_eq!(gallery.count_label(), "2 eggs submitted");
    assert_eq!(gallery.cards()[0].record.submitter, "Ash");
    assert_eq!(gallery.cards()[0].record.moves, vec!["Thunderbolt"]);
    assert_eq!(gallery.cards()[1].record.submitter, "Misty");
}

#[tokio::test]
async fn test_submit_keeps_other_writers_records() {
    let foreign = foreign_record_json("Misty");
    let mut unreadable = foreign_record_json("Brock");
    unreadable["submittedAt"] = json!(null);
    let github = FakeContentsApi::with_records(vec![foreign.clone(), unreadable.clone()]);
    let pokeapi = FakePokeApi::start().with_pokemon(25, "pikachu", None);
    let pool = pool_for(&github, &pokeapi);

    let gallery = pool.gallery().await.unwrap();
    assert_eq!(gallery.count_label(), "2 eggs submitted");
    assert_eq!(gallery.skipped(), 1);

    let entity = pool.lookup("pikachu").await.unwrap();
    pool.submissions()
        .submit(&SubmissionForm::new("Ash"), Some(&entity))
        .await
        .unwrap();

    let records = github.records();
    assert_eq!(records.len(), 3);
    assert_eq!(
        serde_json::to_string(&records[0]).unwrap(),
        serde_json::to_string(&foreign).unwrap()
    );
    assert_eq!(records[0]["submittedAt"], "2024-05-01T12:00:00.000Z");
    assert_eq!(records[1], unreadable);
    assert_eq!(records[2]["submitter"], "Ash");
}

#[tokio::test]
async fn test_submit_survives_concurrent_commit() {
    let github = FakeContentsApi::start();
    let pokeapi = FakePokeApi::start().with_pokemon(133, "eevee", None);
    let config = fast(
        PoolConfig::new()
            .with_github(github.config())
            .with_catalog_api(pokeapi.base_url()),
    );
    let pool = EggPool::from_config(config).unwrap();
    github.race_next_put(record_json(&sample_record("Brock")));

    let entity = pool.lookup("eevee").await.unwrap();
    let mut labels = Vec::new();
    let receipt = pool
        .submissions()
        .submit_observed(&SubmissionForm::new("Ash"), Some(&entity), |state| {
            labels.push(progress_label(state, 3));
        })
        .await
        .unwrap();

    assert_eq!(receipt.outcome.attempts, 2);
    assert!(labels.contains(&"Retrying… (2/3)".to_string()));
    let submitters: Vec<_> = github
        .records()
        .iter()
        .map(|r| r["submitter"].clone())
        .collect();
    assert_eq!(submitters, vec![json!("Brock"), json!("Ash")]);
}

#[tokio::test]
async fn test_auth_failure_is_reported_once() {
    let github = FakeContentsApi::start();
    let pokeapi = FakePokeApi::start().with_pokemon(25, "pikachu", None);
    let pool = pool_for(&github, &pokeapi);
    github.fail_next_put(401, "Bad credentials");

    let entity = pool.lookup("pikachu").await.unwrap();
    let err = pool
        .submissions()
        .submit(&SubmissionForm::new("Ash"), Some(&entity))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Submission failed: Bad credentials");
    assert_eq!(err.attempts(), 1);
    assert!(matches!(&err, SubmissionError::Failed(f) if f.kind() == ErrorKind::Transport));
    assert_eq!(github.put_count(), 1);
    assert!(github.records().is_empty());
}

#[tokio::test]
async fn test_gallery_failure_message() {
    let github = FakeContentsApi::start();
    github.fail_gets(Some(500));
    let pokeapi = FakePokeApi::start();
    let pool = pool_for(&github, &pokeapi);

    let err = pool.gallery().await.unwrap_err();

    assert_eq!(format!("Failed to load eggs: {err}"), "Failed to load eggs: GitHub API error: 500");
}

#[tokio::test]
async fn test_reference_lists_cached_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let github = FakeContentsApi::start();
    let pokeapi = FakePokeApi::start()
        .with_list("move", &["vine-whip", "whirlwind", "will-o-wisp"])
        .with_list("pokemon", &["bulbasaur"])
        .with_list("ability", &["overgrow"])
        .with_attribute("holdable", &["leftovers"]);

    let config = PoolConfig::new()
        .with_github(github.config())
        .with_catalog_api(pokeapi.base_url())
        .with_cache_dir(dir.path());
    let first = EggPool::from_config(config.clone()).unwrap();
    let lists = first.reference_lists().await;
    assert_eq!(lists.names_or_empty(pool_catalog::ReferenceList::Items), ["Leftovers"]);
    let fetched = pokeapi.request_count();

    let second = EggPool::from_config(config).unwrap();
    let moves = second
        .reference_list(pool_catalog::ReferenceList::Moves)
        .await
        .unwrap();
    assert_eq!(pokeapi.request_count(), fetched);

    let select = second.select_for(moves);
    select.set_query("whi");
    assert_eq!(select.results(), vec!["Vine Whip", "Whirlwind"]);
}
