//! In-process chat endpoint for integration tests.
//!
//! ```text
//! POST /ok        200 {"response": "Paris"}
//! POST /empty     200 {}
//! POST /fail      500 "boom"
//! POST /not-json  200 "plain text"
//! POST /slow      200 {"response": "Paris"} after 200 ms
//! ```
//! Every route counts hits and records the `prompt` it received.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct MockState {
    hits: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<Value>>>,
}

impl MockState {
    fn record(&self, body: &Value) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(body.clone());
    }
}

pub struct MockEndpoint {
    base: String,
    state: MockState,
}

impl MockEndpoint {
    pub fn url(&self, route: &str) -> String {
        format!("{}{route}", self.base)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Request bodies received so far, in order.
    pub fn bodies(&self) -> Vec<Value> {
        self.state.prompts.lock().unwrap().clone()
    }
}

async fn ok(State(s): State<MockState>, Json(body): Json<Value>) -> Json<Value> {
    s.record(&body);
    Json(json!({ "response": "Paris", "model": "mock" }))
}

async fn empty(State(s): State<MockState>, Json(body): Json<Value>) -> Json<Value> {
    s.record(&body);
    Json(json!({}))
}

async fn fail(State(s): State<MockState>, Json(body): Json<Value>) -> (StatusCode, &'static str) {
    s.record(&body);
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn not_json(State(s): State<MockState>, Json(body): Json<Value>) -> &'static str {
    s.record(&body);
    "plain text"
}

async fn slow(State(s): State<MockState>, Json(body): Json<Value>) -> Json<Value> {
    s.record(&body);
    tokio::time::sleep(Duration::from_millis(200)).await;
    Json(json!({ "response": "Paris" }))
}

pub async fn spawn_mock() -> MockEndpoint {
    let state = MockState::default();
    let app = Router::new()
        .route("/ok", post(ok))
        .route("/empty", post(empty))
        .route("/fail", post(fail))
        .route("/not-json", post(not_json))
        .route("/slow", post(slow))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockEndpoint { base: format!("http://{addr}"), state }
}
