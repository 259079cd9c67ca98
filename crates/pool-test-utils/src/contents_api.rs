use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parking_lot::Mutex;
use pool_store::GitHubContentsConfig;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::Filter;

type Reply = WithStatus<Json>;

#[derive(Debug, Default)]
struct ContentsState {
    records: Vec<Value>,
    revision: u64,
    gets: usize,
    puts: usize,
    fail_gets: Option<u16>,
    fail_next_put: Option<(u16, String)>,
    race_next_put: Option<Value>,
    omit_next_put_sha: bool,
    last_authorization: Option<String>,
    last_ref: Option<String>,
    last_cache_control: Option<String>,
    last_branch: Option<String>,
    commit_messages: Vec<String>,
}

impl ContentsState {
    fn sha(&self) -> String {
        format!("{:040x}", 0x00c0_ffee_u64 + self.revision)
    }

    /// Base64 of the pretty document, wrapped at 60 columns like the real API
    fn encoded(&self) -> String {
        let mut text = serde_json::to_string_pretty(&self.records).unwrap();
        text.push('\n');
        let encoded = STANDARD.encode(text);
        encoded
            .as_bytes()
            .chunks(60)
            .map(|line| std::str::from_utf8(line).unwrap())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn reply(body: &Value, status: StatusCode) -> Reply {
    warp::reply::with_status(warp::reply::json(body), status)
}

fn status_code(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn handle_get(
    state: &Mutex<ContentsState>,
    query: &HashMap<String, String>,
    authorization: Option<String>,
    cache_control: Option<String>,
) -> Reply {
    let mut state = state.lock();
    state.gets += 1;
    state.last_authorization = authorization;
    state.last_ref = query.get("ref").cloned();
    state.last_cache_control = cache_control;

    if let Some(code) = state.fail_gets {
        return reply(&json!({ "message": "Server Error" }), status_code(code));
    }

    reply(
        &json!({
            "type": "file",
            "encoding": "base64",
            "content": state.encoded(),
            "sha": state.sha(),
        }),
        StatusCode::OK,
    )
}

fn handle_put(
    state: &Mutex<ContentsState>,
    path: &str,
    authorization: Option<String>,
    body: &Value,
) -> Reply {
    let mut state = state.lock();
    state.puts += 1;
    state.last_authorization = authorization;

    if let Some(record) = state.race_next_put.take() {
        state.records.push(record);
        state.revision += 1;
    }
    if let Some((code, message)) = state.fail_next_put.take() {
        return reply(&json!({ "message": message }), status_code(code));
    }

    let current = state.sha();
    if body.get("sha").and_then(Value::as_str) != Some(current.as_str()) {
        return reply(
            &json!({ "message": format!("{path} does not match {current}") }),
            StatusCode::CONFLICT,
        );
    }

    let records = body
        .get("content")
        .and_then(Value::as_str)
        .and_then(|content| STANDARD.decode(content).ok())
        .and_then(|bytes| serde_json::from_slice::<Vec<Value>>(&bytes).ok());
    let Some(records) = records else {
        return reply(
            &json!({ "message": "content is not a Base64 JSON array" }),
            StatusCode::BAD_REQUEST,
        );
    };

    state.records = records;
    state.revision += 1;
    state.last_branch = body.get("branch").and_then(Value::as_str).map(String::from);
    state.commit_messages.push(
        body.get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    );

    if std::mem::take(&mut state.omit_next_put_sha) {
        return reply(&json!({ "commit": { "message": "ok" } }), StatusCode::OK);
    }
    reply(
        &json!({ "content": { "path": path, "sha": state.sha() } }),
        StatusCode::OK,
    )
}

/// In-process stand-in for the GitHub contents endpoint of one file.
///
/// Enforces the sha check on `PUT` exactly like the real API, answering a
/// stale sha with `409 {"message": "<path> does not match <sha>"}`.
pub struct FakeContentsApi {
    addr: SocketAddr,
    state: Arc<Mutex<ContentsState>>,
    server: JoinHandle<()>,
}

impl FakeContentsApi {
    /// Bind on an ephemeral localhost port; must be called inside a runtime
    pub fn start() -> Self {
        let state = Arc::new(Mutex::new(ContentsState::default()));
        let with_state = {
            let state = state.clone();
            warp::any().map(move || state.clone())
        };

        let get = warp::get()
            .and(warp::path!("repos" / String / String / "contents" / String))
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::header::optional::<String>("authorization"))
            .and(warp::header::optional::<String>("cache-control"))
            .and(with_state.clone())
            .map(
                |_owner: String,
                 _repo: String,
                 _path: String,
                 query: HashMap<String, String>,
                 authorization: Option<String>,
                 cache_control: Option<String>,
                 state: Arc<Mutex<ContentsState>>| {
                    handle_get(&state, &query, authorization, cache_control)
                },
            );

        let put = warp::put()
            .and(warp::path!("repos" / String / String / "contents" / String))
            .and(warp::header::optional::<String>("authorization"))
            .and(warp::body::json::<Value>())
            .and(with_state)
            .map(
                |_owner: String,
                 _repo: String,
                 path: String,
                 authorization: Option<String>,
                 body: Value,
                 state: Arc<Mutex<ContentsState>>| {
                    handle_put(&state, &path, authorization, &body)
                },
            );

        let (addr, server) = warp::serve(get.or(put)).bind_ephemeral(([127, 0, 0, 1], 0));
        let server = tokio::spawn(server);
        Self {
            addr,
            state,
            server,
        }
    }

    /// Start with `records` already committed
    pub fn with_records(records: Vec<Value>) -> Self {
        let api = Self::start();
        api.state.lock().records = records;
        api
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Store config pointing at this server with token `test-token`
    pub fn config(&self) -> GitHubContentsConfig {
        GitHubContentsConfig::new("trainer", "egg-pool")
            .with_api_base(self.base_url())
            .with_token("test-token")
    }

    pub fn records(&self) -> Vec<Value> {
        self.state.lock().records.clone()
    }

    pub fn sha(&self) -> String {
        self.state.lock().sha()
    }

    pub fn get_count(&self) -> usize {
        self.state.lock().gets
    }

    pub fn put_count(&self) -> usize {
        self.state.lock().puts
    }

    pub fn commit_messages(&self) -> Vec<String> {
        self.state.lock().commit_messages.clone()
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state.lock().last_authorization.clone()
    }

    pub fn last_ref(&self) -> Option<String> {
        self.state.lock().last_ref.clone()
    }

    pub fn last_cache_control(&self) -> Option<String> {
        self.state.lock().last_cache_control.clone()
    }

    pub fn last_branch(&self) -> Option<String> {
        self.state.lock().last_branch.clone()
    }

    /// Answer every `GET` with `status` until cleared
    pub fn fail_gets(&self, status: Option<u16>) {
        self.state.lock().fail_gets = status;
    }

    /// Answer the next `PUT` with `status` and `{"message": message}`
    pub fn fail_next_put(&self, status: u16, message: &str) {
        self.state.lock().fail_next_put = Some((status, message.to_string()));
    }

    /// Commit `record` as another writer just before the next `PUT` is checked
    pub fn race_next_put(&self, record: Value) {
        self.state.lock().race_next_put = Some(record);
    }

    /// Accept the next `PUT` but leave the new sha out of the response
    pub fn omit_next_put_sha(&self) {
        self.state.lock().omit_next_put_sha = true;
    }
}

impl Drop for FakeContentsApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}
