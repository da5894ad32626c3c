//! Mock Taskicle backend for integration tests
//!
//! Serves the `{ r, r2, err_msg, data }` envelope on the same routes as the
//! real server and records what the client sent

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use taskicle_client::{ContentFrame, SaveFrame};
use taskicle_core::ApiResultCode;
use tokio_util::sync::CancellationToken;

/// Session id handed out on a successful login
pub const SESSION_ID: &str = "5349443001";

/// Password accepted by the mock login
pub const PASSWORD: &str = "correct horse";

/// Project id for which the task list reports "not found"
pub const MISSING_PROJECT: i64 = 404;

/// Header recorded from every request, for interceptor tests
pub const TAG_HEADER: &str = "x-request-tag";

/// Id handed out by `page_insert`
pub const CREATED_PAGE: i64 = 31;

/// Registration key accepted by the mock
pub const REGISTER_KEY: &str = "invite-2024";

/// Mock backend bound to a random local port
pub struct MockBackend {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

#[derive(Default)]
struct MockState {
    request_count: AtomicU32,
    last_cookie: Mutex<Option<String>>,
    last_tag: Mutex<Option<String>>,
    last_query: Mutex<HashMap<String, String>>,
    bodies: Mutex<Vec<(&'static str, Value)>>,
    /// Page content keyed by page id and draft flag
    pages: Mutex<HashMap<(i32, bool), String>>,
    /// Saved versions per page, oldest first
    versions: Mutex<HashMap<i32, Vec<String>>>,
}

impl MockState {
    fn record(&self, headers: &HeaderMap) {
        self.request_count.fetch_add(1, Ordering::Relaxed);

        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);
        *self.last_cookie.lock().unwrap() = header(COOKIE.as_str());
        *self.last_tag.lock().unwrap() = header(TAG_HEADER);
    }

    fn logged_in(&self) -> bool {
        let expected = format!("sid={SESSION_ID}");
        self.last_cookie.lock().unwrap().as_deref() == Some(expected.as_str())
    }
}

impl MockBackend {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        Self::serve(None).await
    }

    /// Start the mock server with every route below `prefix`, as behind a
    /// reverse proxy
    pub async fn start_with_prefix(prefix: &str) -> anyhow::Result<Self> {
        Self::serve(Some(prefix)).await
    }

    async fn serve(prefix: Option<&str>) -> anyhow::Result<Self> {
        let state = Arc::new(MockState::default());

        let api = Router::new()
            .route("/api/login", routing::get(handle_login))
            .route("/api/register", routing::post(handle_register))
            .route("/api/proj_list", routing::get(handle_project_list))
            .route("/api/proj_insert", routing::post(handle_project_insert))
            .route("/api/proj_update", routing::post(handle_project_update))
            .route("/api/proj_delete", routing::post(handle_project_delete))
            .route("/api/task_list", routing::get(handle_task_list))
            .route("/api/task_insert", routing::post(handle_task_insert))
            .route("/api/task_update", routing::post(handle_task_update))
            .route("/api/task_delete", routing::post(handle_task_delete))
            .route("/api/task_comm_list", routing::get(handle_comment_list))
            .route("/api/task_comm_insert", routing::post(handle_comment_insert))
            .route("/api/task_comm_update", routing::post(handle_comment_update))
            .route("/api/task_comm_delete", routing::post(handle_comment_delete))
            .route("/api/page_group_list", routing::get(handle_group_list))
            .route("/api/page_group_insert", routing::post(handle_group_insert))
            .route("/api/page_group_update", routing::post(handle_group_update))
            .route("/api/page_group_delete", routing::post(handle_group_delete))
            .route("/api/page_list", routing::get(handle_page_list))
            .route("/api/page_insert", routing::post(handle_page_insert))
            .route("/api/page_update", routing::post(handle_page_update))
            .route("/api/page_delete", routing::post(handle_page_delete))
            .route("/api/page_save", routing::post(handle_page_save))
            .route("/api/page_load", routing::get(handle_page_load))
            .route("/api/page_version_list", routing::get(handle_version_list))
            .route("/api/page_version_content", routing::get(handle_version_content))
            .route("/api/broken", routing::get(handle_broken))
            .route("/api/garbage", routing::get(handle_garbage))
            .with_state(Arc::clone(&state));

        let app = match prefix {
            Some(prefix) => Router::new().nest(prefix, api),
            None => api,
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// `Cookie` header of the latest request
    pub fn last_cookie(&self) -> Option<String> {
        self.state.last_cookie.lock().unwrap().clone()
    }

    /// Value of [`TAG_HEADER`] on the latest request
    pub fn last_tag(&self) -> Option<String> {
        self.state.last_tag.lock().unwrap().clone()
    }

    /// Query string of the latest list request
    pub fn last_query(&self) -> HashMap<String, String> {
        self.state.last_query.lock().unwrap().clone()
    }

    /// JSON bodies received by the write endpoints, with the route name
    pub fn bodies(&self) -> Vec<(&'static str, Value)> {
        self.state.bodies.lock().unwrap().clone()
    }

    /// Stored content of a page or its draft
    pub fn page_content(&self, page_id: i32, draft: bool) -> Option<String> {
        self.state.pages.lock().unwrap().get(&(page_id, draft)).cloned()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Address that refuses connections
pub async fn unreachable_base_url() -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

// -- Envelopes --

fn ok(data: Value) -> Json<Value> {
    Json(json!({ "r": 0, "r2": 0, "err_msg": "", "data": data }))
}

fn ok_empty() -> Json<Value> {
    Json(json!({ "r": 0, "r2": 0, "err_msg": "" }))
}

fn fail(r: i64, err_msg: &str) -> Json<Value> {
    Json(json!({ "r": r, "r2": 0, "err_msg": err_msg }))
}

// -- Handlers --

async fn handle_login(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record(&headers);

    if query.get("password").map(String::as_str) != Some(PASSWORD) {
        return fail(13, "wrong password").into_response();
    }

    let role = if query.get("user_name").map(String::as_str) == Some("admin") {
        2
    } else {
        1
    };

    (
        [(SET_COOKIE, format!("sid={SESSION_ID}; Max-Age=864000;"))],
        ok(json!({ "role": role })),
    )
        .into_response()
}

async fn handle_register(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(&headers);

    let key_ok = body["key"] == json!(REGISTER_KEY);
    state.bodies.lock().unwrap().push(("register", body));

    if !key_ok {
        return fail(12, "bad registration key");
    }
    ok_empty()
}

async fn handle_project_list(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Json<Value> {
    state.record(&headers);

    if !state.logged_in() {
        return fail(12, "login required");
    }

    ok(json!([
        { "project_id": 1, "project_name": "Website relaunch", "create_at": 1_700_000_000_000_i64 },
        { "project_id": 2, "project_name": "Quarterly audit", "create_at": 1_700_000_500_000_i64 },
    ]))
}

async fn handle_project_insert(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(&headers);
    state.bodies.lock().unwrap().push(("proj_insert", body));
    ok_empty()
}

async fn handle_project_update(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(&headers);
    state.bodies.lock().unwrap().push(("proj_update", body));
    ok_empty()
}

async fn handle_project_delete(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(&headers);

    let missing = body["project_id"] == json!(MISSING_PROJECT);
    state.bodies.lock().unwrap().push(("proj_delete", body));

    if missing {
        return fail(8, "no rows deleted");
    }
    ok_empty()
}

async fn handle_task_list(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.record(&headers);
    *state.last_query.lock().unwrap() = query.clone();

    let project_id: i64 = query.get("project_id").and_then(|id| id.parse().ok()).unwrap_or_default();
    if project_id == MISSING_PROJECT {
        return fail(10, "");
    }

    ok(json!([
        {
            "task_id": 11,
            "task_name": "Draft landing page",
            "status": 1,
            "priority": 3,
            "description": "hero section first",
            "create_at": 1_700_000_000_000_i64,
            "update_at": 1_700_000_100_000_i64,
            "expire_at": 0,
            "assignee_id": 2,
            "creator_id": 1,
        },
        {
            "task_id": 12,
            "task_name": "Legacy import",
            "status": 7,
            "priority": 0,
        },
    ]))
}

async fn handle_task_insert(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(&headers);
    state.bodies.lock().unwrap().push(("task_insert", body));
    ok_empty()
}

async fn handle_task_update(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(&headers);

    let field_count = body.as_object().map_or(0, serde_json::Map::len);
    state.bodies.lock().unwrap().push(("task_update", body));

    if field_count <= 1 {
        return fail(5, "nothing to update");
    }
    ok_empty()
}

async fn handle_task_delete(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(&headers);
    state.bodies.lock().unwrap().push(("task_delete", body));
    ok_empty()
}

/// Record the JSON body under `route` and succeed
fn record_body(state: &MockState, headers: &HeaderMap, route: &'static str, body: Value) -> Json<Value> {
    state.record(headers);
    state.bodies.lock().unwrap().push((route, body));
    ok_empty()
}

async fn handle_comment_list(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.record(&headers);
    *state.last_query.lock().unwrap() = query;

    ok(json!([
        {
            "comm_id": 70,
            "user_id": 2,
            "content": "blocked on copy review",
            "create_at": 1_700_000_200_000_i64,
            "modified": true,
            "user_name": "mei",
        },
        { "comm_id": 71, "user_id": 1, "content": "unblocked", "create_at": 1_700_000_300_000_i64, "modified": false },
    ]))
}

async fn handle_comment_insert(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record_body(&state, &headers, "task_comm_insert", body)
}

async fn handle_comment_update(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record_body(&state, &headers, "task_comm_update", body)
}

async fn handle_comment_delete(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record_body(&state, &headers, "task_comm_delete", body)
}

async fn handle_group_list(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.record(&headers);
    *state.last_query.lock().unwrap() = query;

    ok(json!([
        { "page_group_id": 5, "group_name": "Handbook", "create_at": 1_700_000_000_000_i64 },
        { "page_group_id": 6, "group_name": "Release notes" },
    ]))
}

async fn handle_group_insert(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record_body(&state, &headers, "page_group_insert", body)
}

async fn handle_group_update(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record_body(&state, &headers, "page_group_update", body)
}

async fn handle_group_delete(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record_body(&state, &headers, "page_group_delete", body)
}

async fn handle_page_list(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.record(&headers);

    let has_group = query.contains_key("group_id");
    *state.last_query.lock().unwrap() = query;

    if !has_group {
        return fail(3, "group_id");
    }

    ok(json!([
        { "page_id": 30, "page_name": "Onboarding", "create_at": 1_700_000_000_000_i64, "has_draft": true },
        { "page_id": 31, "page_name": "Style guide", "create_at": 1_700_000_400_000_i64, "has_draft": false },
    ]))
}

async fn handle_page_insert(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(&headers);
    state.bodies.lock().unwrap().push(("page_insert", body));
    ok(json!({ "page_id": CREATED_PAGE }))
}

async fn handle_page_update(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record_body(&state, &headers, "page_update", body)
}

async fn handle_page_delete(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record_body(&state, &headers, "page_delete", body)
}

async fn handle_page_save(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Json<Value> {
    state.record(&headers);

    let Ok(frame) = SaveFrame::decode(&body) else {
        return fail(2, "invalid page frame");
    };

    let content = String::from_utf8_lossy(&frame.content).into_owned();
    if frame.is_draft {
        state.pages.lock().unwrap().insert((frame.page_id, true), content);
    } else {
        let mut pages = state.pages.lock().unwrap();
        pages.remove(&(frame.page_id, true));
        pages.insert((frame.page_id, false), content.clone());
        state.versions.lock().unwrap().entry(frame.page_id).or_default().push(content);
    }
    ok_empty()
}

fn query_number<T: std::str::FromStr>(query: &HashMap<String, String>, key: &str) -> Option<T> {
    query.get(key).and_then(|value| value.parse().ok())
}

fn content_response(frame: &ContentFrame) -> Response {
    match frame.encode() {
        Ok(bytes) => bytes.into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn handle_page_load(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record(&headers);

    let (Some(page_id), Some(draft)) = (query_number::<i32>(&query, "page_id"), query_number::<u8>(&query, "is_draft"))
    else {
        return content_response(&ContentFrame::failure(ApiResultCode::RequiredFieldMissing, 0));
    };
    *state.last_query.lock().unwrap() = query;

    let stored = state.pages.lock().unwrap().get(&(page_id, draft == 1)).cloned();
    match stored {
        Some(content) => content_response(&ContentFrame::ok(content)),
        None => content_response(&ContentFrame::failure(ApiResultCode::NotFound, 0)),
    }
}

async fn handle_version_list(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.record(&headers);

    let page_id: i32 = query_number(&query, "page_id").unwrap_or_default();
    *state.last_query.lock().unwrap() = query;

    let count = state.versions.lock().unwrap().get(&page_id).map_or(0, Vec::len);
    let rows: Vec<Value> = (1..=count)
        .rev()
        .map(|ver_id| {
            json!({
                "ver_id": ver_id,
                "user_id": 1,
                "create_at": 1_700_000_000_i64 + i64::try_from(ver_id).unwrap_or_default(),
                "description": format!("revision {ver_id}"),
            })
        })
        .collect();
    ok(Value::Array(rows))
}

async fn handle_version_content(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record(&headers);

    let page_id: i32 = query_number(&query, "page_id").unwrap_or_default();
    let ver_id: usize = query_number(&query, "ver_id").unwrap_or_default();

    let content = state
        .versions
        .lock()
        .unwrap()
        .get(&page_id)
        .and_then(|versions| versions.get(ver_id.checked_sub(1)?).cloned());
    match content {
        Some(content) => content_response(&ContentFrame::ok(content)),
        None => content_response(&ContentFrame::failure(ApiResultCode::NotFound, 0)),
    }
}

async fn handle_broken(State(state): State<Arc<MockState>>, headers: HeaderMap) -> impl IntoResponse {
    state.record(&headers);
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn handle_garbage(State(state): State<Arc<MockState>>, headers: HeaderMap) -> &'static str {
    state.record(&headers);
    "<html>maintenance</html>"
}
