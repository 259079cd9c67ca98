use pool_catalog::{EntityLookup, PokeApiClient, ReferenceList, ReferenceListProvider};
use pool_model::ErrorKind;
use pool_test_utils::FakePokeApi;
use pretty_assertions::assert_eq;

fn client_for(api: &FakePokeApi) -> PokeApiClient {
    PokeApiClient::with_base(&api.base_url()).unwrap()
}

#[tokio::test]
async fn test_named_lists_are_formatted_and_limited() {
    let api = FakePokeApi::start()
        .with_list("move", &["vine-whip", "will-o-wisp", "tackle"])
        .with_list("pokemon", &["bulbasaur", "mr-mime"]);
    let client = client_for(&api);

    let moves = client.fetch_names(ReferenceList::Moves).await.unwrap();
    let pokemon = client.fetch_names(ReferenceList::Pokemon).await.unwrap();

    assert_eq!(moves, vec!["Vine Whip", "Will O Wisp", "Tackle"]);
    assert_eq!(pokemon, vec!["Bulbasaur", "Mr Mime"]);
    assert_eq!(api.requests(), vec!["/move?limit=750", "/pokemon?limit=807"]);
}

#[tokio::test]
async fn test_list_failure_is_transport() {
    let api = FakePokeApi::start();
    api.fail("ability");
    let client = client_for(&api);

    let err = client.fetch_names(ReferenceList::Abilities).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_missing_list_is_transport_not_miss() {
    let api = FakePokeApi::start();
    let client = client_for(&api);

    let err = client.fetch_names(ReferenceList::Moves).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_items_are_union_of_holdable_attributes() {
    let api = FakePokeApi::start()
        .with_attribute("holdable", &["leftovers", "light-ball"])
        .with_attribute("holdable-passive", &["leftovers", "everstone"])
        .with_attribute("holdable-active", &["focus-sash"]);
    let client = client_for(&api);

    let items = client.fetch_names(ReferenceList::Items).await.unwrap();

    assert_eq!(items, vec!["Everstone", "Focus Sash", "Leftovers", "Light Ball"]);
    assert_eq!(api.request_count(), 3);
}

#[tokio::test]
async fn test_failing_attribute_contributes_nothing() {
    let api = FakePokeApi::start()
        .with_attribute("holdable", &["leftovers"])
        .with_attribute("holdable-passive", &["everstone"])
        .with_attribute("holdable-active", &["focus-sash"]);
    api.fail("item-attribute/holdable-active");
    let client = client_for(&api);

    let items = client.fetch_names(ReferenceList::Items).await.unwrap();

    assert_eq!(items, vec!["Everstone", "Leftovers"]);
}

#[tokio::test]
async fn test_all_attributes_failing_is_an_error() {
    let api = FakePokeApi::start();
    let client = client_for(&api);

    let err = client.fetch_names(ReferenceList::Items).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_lookup_by_display_name() {
    let api = FakePokeApi::start().with_pokemon(122, "mr-mime", Some("https://img/122.png"));
    let client = client_for(&api);

    let entity = client.lookup("  Mr   Mime ").await.unwrap();

    assert_eq!(entity.id, 122);
    assert_eq!(entity.name, "mr-mime");
    assert_eq!(entity.image_ref, "https://img/122.png");
    assert_eq!(api.requests(), vec!["/pokemon/mr-mime"]);
}

#[tokio::test]
async fn test_lookup_by_dex_number_with_sprite_fallback() {
    let api = FakePokeApi::start().with_pokemon(25, "pikachu", None);
    let client = client_for(&api);

    let entity = client.lookup("25").await.unwrap();

    assert_eq!(entity.display_label(), "Pikachu (#25)");
    assert_eq!(
        entity.image_ref,
        "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/25.png"
    );
}

#[tokio::test]
async fn test_lookup_miss_is_not_found() {
    let api = FakePokeApi::start();
    let client = client_for(&api);

    let err = client.lookup("missingno").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "Pokemon not found");
}

#[tokio::test]
async fn test_lookup_server_error_is_transport() {
    let api = FakePokeApi::start().with_pokemon(25, "pikachu", None);
    api.fail("pokemon/*");
    let client = client_for(&api);

    let err = client.lookup("pikachu").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
}
