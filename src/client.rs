//! Chat endpoint client — the one outbound call the session makes.
//!
//! Wire format:
//! ```text
//! POST <endpoint>            {"prompt": "<submission>"}
//! 2xx                        {"response": "<text>", ...}
//! ```
//! A 2xx body without a usable `response` string is still a success; the
//! reply degrades to [`NO_CONTENT_PLACEHOLDER`]. No auth, no retries.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::ClientConfig;
use crate::draft::Submission;
use crate::error::AppError;

/// Shown when the endpoint answers without any text.
pub const NO_CONTENT_PLACEHOLDER: &str = "No response received";

/// Shown when a transport failure carries no message of its own.
pub const GENERIC_FAILURE: &str = "Failed to send message. Please try again.";

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// The request never produced a response (refused, DNS, timeout, ...).
    #[error("{0}")]
    Transport(String),
    /// The endpoint answered with a non-success status.
    #[error("HTTP error! status: {0}")]
    Status(u16),
    /// 2xx, but the body was not JSON.
    #[error("malformed response body: {0}")]
    Body(String),
}

impl ChatError {
    /// Transport failure with the generic fallback for empty messages.
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self::Transport(GENERIC_FAILURE.to_string())
        } else {
            Self::Transport(message)
        }
    }
}

// ── Reply ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    /// `true` when `text` is the placeholder rather than endpoint content.
    pub content_absent: bool,
}

impl ChatReply {
    fn placeholder() -> Self {
        Self { text: NO_CONTENT_PLACEHOLDER.to_string(), content_absent: true }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    prompt: &'a str,
}

/// Interpret a 2xx body. Only `response` is read; anything else is ignored.
pub fn parse_reply(body: &[u8]) -> Result<ChatReply, ChatError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ChatError::Body(e.to_string()))?;

    match value.get("response").and_then(|v| v.as_str()) {
        Some(text) if !text.is_empty() => {
            Ok(ChatReply { text: text.to_string(), content_absent: false })
        }
        _ => Ok(ChatReply::placeholder()),
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Cheap to clone: `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct HttpChatClient {
    client: Client,
    endpoint: String,
}

impl HttpChatClient {
    /// `timeout` of `None` leaves the request unbounded.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, AppError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Client(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint: endpoint.into() })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, AppError> {
        Self::new(config.endpoint.clone(), config.timeout_seconds.map(Duration::from_secs))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One round-trip. Never retries.
    pub async fn send(&self, submission: &Submission) -> Result<ChatReply, ChatError> {
        let payload = ChatRequest { prompt: submission.as_str() };

        debug!(endpoint = %self.endpoint, prompt_len = payload.prompt.len(), "sending chat request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %self.endpoint, error = %e, "chat request failed (transport)");
                ChatError::transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, %status, "chat endpoint returned HTTP error");
            return Err(ChatError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| {
            warn!(error = %e, "failed to read chat response body");
            ChatError::transport(e.to_string())
        })?;
        trace!(body = %String::from_utf8_lossy(&body), "chat response body");

        let reply = parse_reply(&body)?;
        if reply.content_absent {
            debug!("chat response had no text; using placeholder");
        }
        Ok(reply)
    }
}
