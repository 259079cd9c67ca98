use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::Filter;

type Reply = WithStatus<Json>;

#[derive(Debug, Default)]
struct PokeState {
    lists: HashMap<String, Vec<String>>,
    attributes: HashMap<String, Vec<String>>,
    pokemon: HashMap<String, Value>,
    failing: HashSet<String>,
    requests: Vec<String>,
}

fn not_found() -> Reply {
    warp::reply::with_status(warp::reply::json(&json!("Not Found")), StatusCode::NOT_FOUND)
}

fn server_error() -> Reply {
    warp::reply::with_status(
        warp::reply::json(&json!("Internal Server Error")),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}

fn ok(body: &Value) -> Reply {
    warp::reply::with_status(warp::reply::json(body), StatusCode::OK)
}

fn named(names: impl Iterator<Item = String>) -> Vec<Value> {
    names
        .map(|name| json!({ "name": name, "url": "" }))
        .collect()
}

fn handle_list(state: &Mutex<PokeState>, resource: &str, query: &HashMap<String, String>) -> Reply {
    let mut state = state.lock();
    let limit = query.get("limit").and_then(|l| l.parse::<usize>().ok());
    state.requests.push(match limit {
        Some(limit) => format!("/{resource}?limit={limit}"),
        None => format!("/{resource}"),
    });

    if state.failing.contains(resource) {
        return server_error();
    }
    let Some(names) = state.lists.get(resource) else {
        return not_found();
    };
    let results = named(names.iter().take(limit.unwrap_or(20)).cloned());
    ok(&json!({ "count": names.len(), "results": results }))
}

fn handle_attribute(state: &Mutex<PokeState>, attribute: &str) -> Reply {
    let mut state = state.lock();
    let key = format!("item-attribute/{attribute}");
    state.requests.push(format!("/{key}/"));

    if state.failing.contains(&key) {
        return server_error();
    }
    match state.attributes.get(attribute) {
        Some(items) => ok(&json!({ "name": attribute, "items": named(items.iter().cloned()) })),
        None => not_found(),
    }
}

fn handle_pokemon(state: &Mutex<PokeState>, slug: &str) -> Reply {
    let mut state = state.lock();
    state.requests.push(format!("/pokemon/{slug}"));

    if state.failing.contains("pokemon/*") {
        return server_error();
    }
    match state.pokemon.get(slug) {
        Some(body) => ok(body),
        None => not_found(),
    }
}

/// In-process stand-in for the PokeAPI endpoints the catalog uses
pub struct FakePokeApi {
    addr: SocketAddr,
    state: Arc<Mutex<PokeState>>,
    server: JoinHandle<()>,
}

impl FakePokeApi {
    /// Bind on an ephemeral localhost port; must be called inside a runtime
    pub fn start() -> Self {
        let state = Arc::new(Mutex::new(PokeState::default()));
        let with_state = {
            let state = state.clone();
            warp::any().map(move || state.clone())
        };

        let pokemon = warp::get()
            .and(warp::path!("pokemon" / String))
            .and(with_state.clone())
            .map(|slug: String, state: Arc<Mutex<PokeState>>| handle_pokemon(&state, &slug));

        let attribute = warp::get()
            .and(warp::path!("item-attribute" / String / ..))
            .and(with_state.clone())
            .map(|name: String, state: Arc<Mutex<PokeState>>| handle_attribute(&state, &name));

        let list = warp::get()
            .and(warp::path!(String))
            .and(warp::query::<HashMap<String, String>>())
            .and(with_state)
            .map(
                |resource: String, query: HashMap<String, String>, state: Arc<Mutex<PokeState>>| {
                    handle_list(&state, &resource, &query)
                },
            );

        let routes = pokemon.or(attribute).or(list);
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        let server = tokio::spawn(server);
        Self {
            addr,
            state,
            server,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serve `slugs` from `/<resource>?limit=N`
    pub fn with_list(self, resource: &str, slugs: &[&str]) -> Self {
        self.state.lock().lists.insert(
            resource.to_string(),
            slugs.iter().map(|s| (*s).to_string()).collect(),
        );
        self
    }

    /// Serve `slugs` from `/item-attribute/<attribute>/`
    pub fn with_attribute(self, attribute: &str, slugs: &[&str]) -> Self {
        self.state.lock().attributes.insert(
            attribute.to_string(),
            slugs.iter().map(|s| (*s).to_string()).collect(),
        );
        self
    }

    /// Serve `/pokemon/<name>` (and `/pokemon/<id>`)
    pub fn with_pokemon(self, id: u32, name: &str, sprite: Option<&str>) -> Self {
        let body = json!({
            "id": id,
            "name": name,
            "sprites": { "front_default": sprite },
        });
        let mut state = self.state.lock();
        state.pokemon.insert(id.to_string(), body.clone());
        state.pokemon.insert(name.to_string(), body);
        drop(state);
        self
    }

    /// Answer `route` with 500: a list resource (`move`), an attribute
    /// (`item-attribute/holdable`), or every entity lookup (`pokemon/*`)
    pub fn fail(&self, route: &str) {
        self.state.lock().failing.insert(route.to_string());
    }

    /// Request paths seen so far, in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().requests.len()
    }
}

impl Drop for FakePokeApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}
