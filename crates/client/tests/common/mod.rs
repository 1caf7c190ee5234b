//! In-process fake of the Balances backend for integration tests.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use balances_client::{BalancesClient, BalancesStore, StoreOptions};
use balances_core::session::{Credentials, MemorySessionStore, SessionStore};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub const BASIC_AUTH: &str = "Basic amFuZTpzZWNyZXQ=";
pub const EXPIRATION_MS: i64 = 4_102_444_800_000;

#[derive(Default)]
pub struct Backend {
    /// Records served by `GET {resource}/{id}`, keyed by (resource, id).
    pub records: HashMap<(String, String), Value>,
    /// Full result sets served by `POST {resource}/search`.
    pub search_items: HashMap<String, Vec<Value>>,
    /// Answer every authenticated call with 401.
    pub reject_tokens: bool,
    /// Ids whose detail requests hang.
    pub slow_ids: HashSet<String>,
    /// `METHOD path` of every request received.
    pub requests: Vec<String>,
    pub last_body: Option<Value>,
    pub last_query: Option<String>,
}

impl Backend {
    pub fn with_record(mut self, resource: &str, record: Value) -> Self {
        let id = record["id"].as_str().unwrap_or_default().to_lowercase();
        self.records.insert((resource.to_string(), id), record);
        self
    }

    pub fn with_search(mut self, resource: &str, items: Vec<Value>) -> Self {
        self.search_items.insert(resource.to_string(), items);
        self
    }
}

pub type Shared = Arc<Mutex<Backend>>;

/// Starts the fake backend on a random port and returns its base URL.
pub async fn spawn(backend: Backend) -> (String, Shared) {
    let shared = Arc::new(Mutex::new(backend));
    let app = Router::new().fallback(handle).with_state(shared.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), shared)
}

pub fn client(base_url: &str) -> BalancesClient {
    BalancesClient::new(base_url, Duration::from_secs(5)).unwrap()
}

pub fn store_with(base_url: &str, sessions: Arc<dyn SessionStore>, options: StoreOptions) -> BalancesStore {
    BalancesStore::new(Arc::new(client(base_url)), sessions, options)
}

/// A store already logged in as `jane`.
pub async fn logged_in(base_url: &str) -> (BalancesStore, Arc<MemorySessionStore>) {
    let sessions = Arc::new(MemorySessionStore::new());
    let mut store = store_with(base_url, sessions.clone(), StoreOptions::default());
    store
        .authenticate(&Credentials::new("jane", "secret"))
        .await
        .unwrap();
    (store, sessions)
}

pub fn requests(shared: &Shared) -> Vec<String> {
    shared.lock().unwrap().requests.clone()
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

pub fn user(id: &str, username: &str) -> Value {
    json!({ "id": id, "username": username, "email": format!("{username}@example.com"), "name": username })
}

pub fn account(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "accountName": name,
        "bankName": "First Bank",
        "accountHolderName": "Jane",
        "accountNumber": "0001",
        "lastBalance": 100,
        "lastBalanceDate": 1_700_000_000_000_i64,
        "status": "active",
        "created": 1_690_000_000_000_i64,
        "createdBy": "u1"
    })
}

pub fn balance(id: &str, account_id: &str, created_by: &str) -> Value {
    json!({
        "id": id,
        "bankAccountId": account_id,
        "date": 1_700_000_000_000_i64,
        "balance": 100,
        "created": 1_700_000_000_000_i64,
        "createdBy": created_by
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Routing
// ─────────────────────────────────────────────────────────────────────────────

fn data(status: StatusCode, value: Value) -> Response {
    (status, Json(json!({ "data": value }))).into_response()
}

fn failure(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": code, "message": message } })),
    )
        .into_response()
}

fn authorized(headers: &HeaderMap, backend: &Backend) -> bool {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    !backend.reject_tokens && matches!(bearer, "Bearer token-1" | "Bearer token-2")
}

async fn handle(
    State(shared): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().trim_start_matches('/').to_string();
    let body: Option<Value> = serde_json::from_slice(&body).ok();

    let slow = {
        let mut backend = shared.lock().unwrap();
        backend.requests.push(format!("{method} {path}"));
        backend.last_body = body.clone();
        backend.last_query = uri.query().map(str::to_string);
        let id = path.rsplit('/').next().unwrap_or_default();
        backend.slow_ids.contains(id)
    };
    if slow {
        tokio::time::sleep(Duration::from_secs(30)).await;
    }

    let mut backend = shared.lock().unwrap();

    if path == "health" {
        return (StatusCode::OK, Json(json!({ "message": "OK" }))).into_response();
    }
    if path == "auth/login" {
        let basic = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        if basic != Some(BASIC_AUTH) {
            return failure(StatusCode::UNAUTHORIZED, "Unauthorized", "invalid credentials");
        }
        return data(
            StatusCode::OK,
            json!({ "expiration": EXPIRATION_MS, "token": "token-1", "user": user("U1", "jane") }),
        );
    }
    if !authorized(&headers, &backend) {
        return failure(StatusCode::UNAUTHORIZED, "Unauthorized", "invalid token");
    }
    if path == "auth/token" {
        return data(
            StatusCode::OK,
            json!({ "expiration": EXPIRATION_MS, "token": "token-2" }),
        );
    }

    if let Some(resource) = path.strip_suffix("/search") {
        let filter = body.unwrap_or_default();
        let page = filter["page"].as_u64().unwrap_or(1).max(1) as usize;
        let page_size = filter["pageSize"].as_u64().unwrap_or(10).max(1) as usize;
        let all = backend.search_items.get(resource).cloned().unwrap_or_default();
        let items: Vec<Value> = all
            .iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .cloned()
            .collect();
        let total = all.len();
        return data(
            StatusCode::OK,
            json!({
                "items": items,
                "pageInfo": {
                    "page": page,
                    "pageSize": page_size,
                    "totalCount": total,
                    "pageCount": total.div_ceil(page_size)
                }
            }),
        );
    }

    if method == Method::POST {
        let mut record = body.unwrap_or_else(|| json!({}));
        record["id"] = json!("new-1");
        backend
            .records
            .insert((path.clone(), "new-1".to_string()), record.clone());
        return data(StatusCode::CREATED, record);
    }

    let Some((resource, id)) = path.rsplit_once('/') else {
        return failure(StatusCode::NOT_FOUND, "EntityNotFound", "no such route");
    };
    let key = (resource.to_string(), id.to_lowercase());
    let Some(existing) = backend.records.get(&key).cloned() else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": {
                    "code": "EntityNotFound",
                    "message": "not found",
                    "entity": resource,
                    "operation": "get"
                }
            })),
        )
            .into_response();
    };

    match method {
        Method::GET => data(StatusCode::OK, existing),
        Method::PATCH => {
            let mut record = existing;
            if let (Some(target), Some(Value::Object(changes))) = (record.as_object_mut(), body) {
                for (field, value) in changes {
                    target.insert(field, value);
                }
            }
            backend.records.insert(key, record.clone());
            data(StatusCode::OK, record)
        }
        Method::DELETE => {
            let mut record = existing;
            record["deleted"] = json!(1_710_000_000_000_i64);
            record["deletedBy"] = json!("u1");
            backend.records.insert(key, record.clone());
            data(StatusCode::OK, record)
        }
        _ => failure(StatusCode::BAD_REQUEST, "BadRequest", "unsupported method"),
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("jane", "secret")
}
