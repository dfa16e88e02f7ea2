//! Local stand-in for the Torn and Telegram APIs.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use torn_money_watcher::api::TornClient;
use torn_money_watcher::notify::TelegramSender;
use torn_money_watcher::types::WatchedAccount;
use torn_money_watcher::watcher::Watcher;

pub const ALICE_KEY: &str = "alice-key";

#[derive(Clone, Default)]
pub struct MockApi {
    /// Value of the `log` member; `None` leaves it out of the response.
    pub log: Arc<Mutex<Option<Value>>>,
    /// Known profiles by user id; others answer with a Torn error.
    pub profiles: Arc<Mutex<HashMap<u64, String>>>,
    /// Bodies received on `sendMessage`.
    pub sent: Arc<Mutex<Vec<Value>>>,
    pub telegram_rejects: Arc<AtomicBool>,
    pub log_calls: Arc<AtomicUsize>,
    pub log_delay: Arc<Mutex<Option<Duration>>>,
}

impl MockApi {
    pub fn set_log(&self, log: Value) {
        *self.log.lock().unwrap() = Some(log);
    }

    pub fn add_profile(&self, id: u64, name: &str) {
        self.profiles.lock().unwrap().insert(id, name.to_string());
    }

    pub fn sent(&self) -> Vec<Value> {
        self.sent.lock().unwrap().clone()
    }

    pub fn log_calls(&self) -> usize {
        self.log_calls.load(Ordering::SeqCst)
    }
}

/// A single money-receive entry keyed like Torn does.
pub fn money_log(entries: &[(i64, u64, u64)]) -> Value {
    let map: serde_json::Map<String, Value> = entries
        .iter()
        .enumerate()
        .map(|(i, (timestamp, sender, money))| {
            (
                format!("entry{i}"),
                json!({
                    "log": 4810,
                    "title": "Money receive",
                    "timestamp": timestamp,
                    "category": "Money",
                    "data": { "sender": sender, "money": money }
                }),
            )
        })
        .collect();
    Value::Object(map)
}

fn torn_error(code: i64, message: &str) -> Json<Value> {
    Json(json!({ "error": { "code": code, "error": message } }))
}

async fn log_handler(
    State(mock): State<MockApi>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    mock.log_calls.fetch_add(1, Ordering::SeqCst);
    let delay = *mock.log_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if query.get("selections").map(String::as_str) != Some("log")
        || query.get("key").map(String::as_str) != Some(ALICE_KEY)
    {
        return torn_error(2, "Incorrect key");
    }
    let log = mock.log.lock().unwrap().clone();
    match log {
        Some(log) => Json(json!({ "log": log })),
        None => Json(json!({})),
    }
}

async fn profile_handler(
    State(mock): State<MockApi>,
    Path(id): Path<u64>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    if query.get("selections").map(String::as_str) != Some("profile") {
        return torn_error(3, "Wrong fields");
    }
    let name = mock.profiles.lock().unwrap().get(&id).cloned();
    match name {
        Some(name) => Json(json!({ "player_id": id, "name": name })),
        None => torn_error(6, "Incorrect ID"),
    }
}

async fn telegram_handler(
    State(mock): State<MockApi>,
    Path(_bot): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if mock.telegram_rejects.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "description": "Bad Request: chat not found" })),
        );
    }
    mock.sent.lock().unwrap().push(body);
    (StatusCode::OK, Json(json!({ "ok": true, "result": {} })))
}

/// Serve the mock on an ephemeral port and return its base URL.
pub async fn spawn_mock(mock: MockApi) -> String {
    let app = Router::new()
        .route("/user/", get(log_handler))
        .route("/user/{id}", get(profile_handler))
        .route("/{bot}/sendMessage", post(telegram_handler))
        .with_state(mock);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn alice() -> WatchedAccount {
    WatchedAccount {
        name: "Alice".to_string(),
        api_key: ALICE_KEY.to_string(),
    }
}

/// Watcher pointed at the mock for both APIs.
pub fn watcher_for(base: &str, accounts: Vec<WatchedAccount>) -> Watcher {
    let http = reqwest::Client::new();
    let torn = TornClient::new(http.clone(), base).unwrap();
    let telegram = TelegramSender::new(http, base, "123:abc", "42").unwrap();
    Watcher::new(torn, Some(telegram), accounts, 50)
}
