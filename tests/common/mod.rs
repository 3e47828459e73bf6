#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};

use lesson_notices::{ApiClient, ApiConfig, NoticeElement};

pub const CSRF: &str = "csrf-test";

/// One request seen by the mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub csrf: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

/// Canned answers for the lesson site API.
pub struct MockBackend {
    pub lessons: Vec<String>,
    pub raw_lessons: Option<String>,
    pub notice: bool,
    pub status: StatusCode,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            lessons: Vec::new(),
            raw_lessons: None,
            notice: true,
            status: StatusCode::OK,
        }
    }
}

impl MockBackend {
    pub fn with_lessons(dates: &[&str]) -> Self {
        Self {
            lessons: dates.iter().map(|d| (*d).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing(status: StatusCode) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }
}

pub struct BackendState {
    config: MockBackend,
    requests: Mutex<Vec<Recorded>>,
}

impl BackendState {
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, method: Method, path: String, headers: &HeaderMap, body: Option<Value>) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().unwrap().push(Recorded {
            method,
            path,
            csrf: header("x-csrftoken"),
            authorization: header("authorization"),
            content_type: header("content-type"),
            body,
        });
    }

    fn failure(&self) -> Option<Response> {
        (self.config.status != StatusCode::OK)
            .then(|| (self.config.status, Json(json!({"detail": "denied"}))).into_response())
    }
}

/// Start the mock backend on an ephemeral port and return a client pointed at it.
pub async fn spawn_backend(config: MockBackend) -> (ApiClient, Arc<BackendState>) {
    let state = Arc::new(BackendState {
        config,
        requests: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/api/get-relevant-lessons", get(relevant_lessons))
        .route("/api/get-token", post(get_token))
        .route("/api/notification/{id}/", get(get_notice).patch(patch_notice))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ApiConfig::new(format!("http://{addr}/").parse().unwrap()).with_csrf_token(CSRF);
    (ApiClient::new(config), state)
}

async fn relevant_lessons(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.record(Method::GET, "/api/get-relevant-lessons".into(), &headers, None);
    if let Some(failure) = state.failure() {
        return failure;
    }
    if let Some(raw) = &state.config.raw_lessons {
        return (StatusCode::OK, raw.clone()).into_response();
    }
    let lessons: Vec<Value> = state
        .config
        .lessons
        .iter()
        .enumerate()
        .map(|(id, date)| {
            json!({"id": id, "student": 1, "salary": 1000, "time": "10:00:00", "date": date})
        })
        .collect();
    Json(lessons).into_response()
}

async fn get_token(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let body: Option<Value> = serde_json::from_str(&body).ok();
    let phone = body
        .as_ref()
        .and_then(|b| b.get("phone"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    state.record(Method::POST, "/api/get-token".into(), &headers, body);
    if let Some(failure) = state.failure() {
        return failure;
    }
    Json(json!({"token": format!("token-{phone}")})).into_response()
}

async fn get_notice(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record(Method::GET, format!("/api/notification/{id}/"), &headers, None);
    if let Some(failure) = state.failure() {
        return failure;
    }
    Json(json!({"notice": state.config.notice, "amount_lesson": 2})).into_response()
}

async fn patch_notice(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let body: Option<Value> = serde_json::from_str(&body).ok();
    let notice = body
        .as_ref()
        .and_then(|b| b.get("notice"))
        .and_then(Value::as_bool)
        .unwrap_or(true);
    state.record(Method::PATCH, format!("/api/notification/{id}/"), &headers, body);
    if let Some(failure) = state.failure() {
        return failure;
    }
    Json(json!({"notice": notice, "amount_lesson": 2})).into_response()
}

/// Notice element recording visibility changes.
#[derive(Default)]
pub struct FakeElement {
    visible: AtomicBool,
    closing: AtomicBool,
    shows: AtomicUsize,
    hides: AtomicUsize,
}

impl FakeElement {
    pub fn shows(&self) -> usize {
        self.shows.load(Ordering::SeqCst)
    }

    pub fn hides(&self) -> usize {
        self.hides.load(Ordering::SeqCst)
    }

    pub fn is_closing(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    /// No visibility change of any kind happened.
    pub fn untouched(&self) -> bool {
        self.shows() == 0 && self.hides() == 0 && !self.is_closing()
    }
}

impl NoticeElement for FakeElement {
    fn show(&self) {
        self.shows.fetch_add(1, Ordering::SeqCst);
        self.closing.store(false, Ordering::SeqCst);
        self.visible.store(true, Ordering::SeqCst);
    }

    fn start_close_animation(&self) {
        self.closing.store(true, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.hides.fetch_add(1, Ordering::SeqCst);
        self.visible.store(false, Ordering::SeqCst);
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}
