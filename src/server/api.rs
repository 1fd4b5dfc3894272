//! Axum handlers for the chat endpoint.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::ServerState;

#[derive(Deserialize)]
pub(super) struct ChatRequest {
    prompt: String,
}

/// Build a JSON error response body.
fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

/// POST /chat
pub(super) async fn chat(State(state): State<ServerState>, Json(req): Json<ChatRequest>) -> Response {
    if req.prompt.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, json_error("bad_request", "prompt must not be empty"))
            .into_response();
    }

    debug!(prompt_len = req.prompt.len(), "chat request");

    match state.provider.complete(&req.prompt).await {
        Ok(text) => (StatusCode::OK, Json(json!({ "response": text }))).into_response(),
        Err(e) => {
            warn!(provider = state.provider.name(), "completion failed: {e}");
            (StatusCode::BAD_GATEWAY, json_error("upstream", e)).into_response()
        }
    }
}

/// GET /health
pub(super) async fn health(State(state): State<ServerState>) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "provider": state.provider.name() })),
    )
        .into_response()
}
