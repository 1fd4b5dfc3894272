//! Chat endpoint server: handlers in-process, and the client against it.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use hkm_chat::client::HttpChatClient;
use hkm_chat::llm::LlmProvider;
use hkm_chat::llm::providers::{dummy::DummyProvider, openai_compatible::OpenAiCompatibleProvider};
use hkm_chat::server;
use hkm_chat::session::ChatSession;
use hkm_chat::view::ViewState;

fn post_chat(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn chat_echoes_with_dummy_provider() {
    let router = server::build_router(LlmProvider::Dummy(DummyProvider));
    let resp = router.oneshot(post_chat(r#"{"prompt":"hi"}"#)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "response": "[echo] hi" }));
}

#[tokio::test]
async fn blank_prompt_is_bad_request() {
    let router = server::build_router(LlmProvider::Dummy(DummyProvider));
    let resp = router.oneshot(post_chat(r#"{"prompt":"  "}"#)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"], "bad_request");
}

#[tokio::test]
async fn missing_prompt_is_rejected() {
    let router = server::build_router(LlmProvider::Dummy(DummyProvider));
    let resp = router.oneshot(post_chat(r#"{"message":"hi"}"#)).await.unwrap();
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn provider_failure_is_bad_gateway() {
    let unreachable = OpenAiCompatibleProvider::new(
        "http://127.0.0.1:9/v1/chat/completions".into(),
        "test-model".into(),
        0.0,
        2,
        None,
    )
    .unwrap();
    let router = server::build_router(LlmProvider::OpenAiCompatible(unreachable));
    let resp = router.oneshot(post_chat(r#"{"prompt":"hi"}"#)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(resp).await["error"], "upstream");
}

#[tokio::test]
async fn health_names_provider() {
    let router = server::build_router(LlmProvider::Dummy(DummyProvider));
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "status": "ok", "provider": "dummy" }));
}

#[tokio::test]
async fn client_and_server_end_to_end() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(server::serve_on(
        listener,
        LlmProvider::Dummy(DummyProvider),
        shutdown.clone(),
    ));

    let client = HttpChatClient::new(format!("http://{addr}/chat"), None).unwrap();
    let mut session = ChatSession::new();
    session.edit_draft("  capital of France?\n");
    session.submit(&client).await;

    assert_eq!(session.view(), &ViewState::Resolved("[echo] capital of France?".into()));
    assert_eq!(session.draft().text(), "");

    shutdown.cancel();
    handle.await.unwrap().unwrap();
}
