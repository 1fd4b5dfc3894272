//! Chat endpoint server — the service the client talks to.
//!
//! ```text
//! POST /chat     {"prompt": "..."}  →  {"response": "..."}
//! GET  /health                      →  {"status": "ok", "provider": "..."}
//! ```
//!
//! Each prompt is answered independently by the configured [`LlmProvider`];
//! nothing is remembered between requests.

mod api;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::AppError;
use crate::llm::LlmProvider;

/// Router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone; providers hold only reference-counted clients.
#[derive(Clone)]
pub(crate) struct ServerState {
    pub provider: LlmProvider,
}

pub fn build_router(provider: LlmProvider) -> Router {
    Router::new()
        .route("/chat", post(api::chat))
        .route("/health", get(api::health))
        .with_state(ServerState { provider })
}

/// Bind `bind_addr` and serve until `shutdown` is cancelled.
pub async fn serve(
    bind_addr: &str,
    provider: LlmProvider,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;
    serve_on(listener, provider, shutdown).await
}

/// Serve on an already-bound listener (tests bind port 0).
pub async fn serve_on(
    listener: TcpListener,
    provider: LlmProvider,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let local = listener
        .local_addr()
        .map_err(|e| AppError::Server(format!("listener has no local address: {e}")))?;
    info!(addr = %local, provider = provider.name(), "chat server listening");

    axum::serve(listener, build_router(provider))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("axum server error: {e}")))?;

    info!("chat server shut down");
    Ok(())
}
