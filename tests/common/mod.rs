#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use urlai::domain::entities::{NewShortLink, ShortLink};
use urlai::domain::repositories::LinkRepository;
use urlai::infrastructure::cache::NullCache;
use urlai::infrastructure::persistence::MemoryLinkRepository;
use urlai::state::AppState;

pub const BASE_URL: &str = "https://urlai.test";
pub const API_KEY: &str = "test-api-key";

/// State backed by the in-memory store, without cache.
pub fn create_test_state() -> (AppState, Arc<MemoryLinkRepository>) {
    let repo = Arc::new(MemoryLinkRepository::new());
    let state = AppState::new(repo.clone(), Arc::new(NullCache::new()), BASE_URL);
    (state, repo)
}

/// State whose store fails every call.
pub fn create_failing_state() -> AppState {
    AppState::new(Arc::new(FailingRepository), Arc::new(NullCache::new()), BASE_URL)
}

pub async fn create_test_link(repo: &MemoryLinkRepository, code: &str, url: &str) -> ShortLink {
    repo.insert(NewShortLink::expiring_from(
        url.to_string(),
        code.to_string(),
        Utc::now(),
    ))
    .await
    .unwrap()
}

pub async fn create_expired_link(repo: &MemoryLinkRepository, code: &str, url: &str) -> ShortLink {
    repo.insert(NewShortLink {
        original_url: url.to_string(),
        short_code: code.to_string(),
        expiry_date: Utc::now() - Duration::hours(1),
    })
    .await
    .unwrap()
}

/// Store that is never reachable.
pub struct FailingRepository;

#[async_trait::async_trait]
impl LinkRepository for FailingRepository {
    async fn insert(&self, _new_link: NewShortLink) -> Result<ShortLink, urlai::AppError> {
        Err(unreachable_store())
    }

    async fn find_by_code(&self, _code: &str) -> Result<Option<ShortLink>, urlai::AppError> {
        Err(unreachable_store())
    }

    async fn list_newest_first(&self) -> Result<Vec<ShortLink>, urlai::AppError> {
        Err(unreachable_store())
    }

    async fn delete_by_id(&self, _id: &str) -> Result<(), urlai::AppError> {
        Err(unreachable_store())
    }

    async fn delete_expired_before(&self, _cutoff: DateTime<Utc>) -> Result<u64, urlai::AppError> {
        Err(unreachable_store())
    }

    async fn health_check(&self) -> Result<(), urlai::AppError> {
        Err(unreachable_store())
    }
}

fn unreachable_store() -> urlai::AppError {
    urlai::AppError::store("Store request failed: connection refused", json!({ "reason": "connect" }))
}

/// A PostgREST-like `urls` table served over HTTP.
///
/// Supports the filters the REST repository sends: `eq.` on `short_code`
/// and `id`, `lt.` on `expiry_date`, `order=created_at.desc`, `limit` and
/// `Prefer: return=representation`.
#[derive(Clone, Default)]
pub struct FakeStore {
    pub rows: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<AtomicI64>,
    failing: Arc<AtomicBool>,
}

impl FakeStore {
    /// Starts the fake store on an ephemeral port and returns its base URL.
    pub async fn spawn() -> (Self, String) {
        let store = Self::default();

        let app = Router::new()
            .route(
                "/rest/v1/urls",
                get(select_rows).post(insert_row).delete(delete_rows),
            )
            .with_state(store.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (store, format!("http://{addr}"))
    }

    /// Makes every following request fail with a 500.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn seed(&self, code: &str, url: &str, expiry_date: DateTime<Utc>, created_at: DateTime<Utc>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.rows.lock().unwrap().push(json!({
            "id": id,
            "original_url": url,
            "short_code": code,
            "expiry_date": expiry_date.to_rfc3339(),
            "created_at": created_at.to_rfc3339(),
        }));
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check(&self, headers: &HeaderMap) -> Option<Response> {
        if self.failing.load(Ordering::SeqCst) {
            return Some(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "code": "XX000", "message": "store is down" })),
                )
                    .into_response(),
            );
        }

        let bearer = format!("Bearer {API_KEY}");
        let key_ok = headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(API_KEY);
        let bearer_ok =
            headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(bearer.as_str());

        if !key_ok || !bearer_ok {
            return Some(
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "Invalid API key" })),
                )
                    .into_response(),
            );
        }

        None
    }
}

fn parse_ts(value: &Value) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value.as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc)
}

fn matches(row: &Value, params: &HashMap<String, String>) -> bool {
    if let Some(code) = params.get("short_code").and_then(|f| f.strip_prefix("eq."))
        && row["short_code"] != code
    {
        return false;
    }

    if let Some(id) = params.get("id").and_then(|f| f.strip_prefix("eq."))
        && row["id"].to_string().trim_matches('"') != id
    {
        return false;
    }

    if let Some(cutoff) = params.get("expiry_date").and_then(|f| f.strip_prefix("lt.")) {
        let cutoff = DateTime::parse_from_rfc3339(cutoff).unwrap().with_timezone(&Utc);
        if parse_ts(&row["expiry_date"]) >= cutoff {
            return false;
        }
    }

    true
}

async fn select_rows(
    State(store): State<FakeStore>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(rejection) = store.check(&headers) {
        return rejection;
    }

    let mut rows: Vec<Value> = store
        .rows
        .lock()
        .unwrap()
        .iter()
        .filter(|row| matches(row, &params))
        .cloned()
        .collect();

    if params.get("order").map(String::as_str) == Some("created_at.desc") {
        rows.sort_by_key(|row| std::cmp::Reverse(parse_ts(&row["created_at"])));
    }

    if let Some(limit) = params.get("limit").and_then(|l| l.parse().ok()) {
        rows.truncate(limit);
    }

    Json(rows).into_response()
}

async fn insert_row(
    State(store): State<FakeStore>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejection) = store.check(&headers) {
        return rejection;
    }

    let mut rows = store.rows.lock().unwrap();
    if rows.iter().any(|row| row["short_code"] == body["short_code"]) {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint \"urls_short_code_key\"",
                "details": "Key (short_code) already exists.",
                "hint": null
            })),
        )
            .into_response();
    }

    let id = store.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let row = json!({
        "id": id,
        "original_url": body["original_url"],
        "short_code": body["short_code"],
        "expiry_date": body["expiry_date"],
        "created_at": Utc::now().to_rfc3339(),
    });
    rows.push(row.clone());

    (StatusCode::CREATED, Json(vec![row])).into_response()
}

async fn delete_rows(
    State(store): State<FakeStore>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(rejection) = store.check(&headers) {
        return rejection;
    }

    let mut rows = store.rows.lock().unwrap();
    let (deleted, kept): (Vec<Value>, Vec<Value>) =
        rows.drain(..).partition(|row| matches(row, &params));
    *rows = kept;

    let wants_rows = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("return=representation"));

    if wants_rows {
        Json(deleted).into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}
