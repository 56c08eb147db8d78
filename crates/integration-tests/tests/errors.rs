mod harness;

use axum::http::StatusCode;
use harness::config::ConfigBuilder;
use harness::mock_backend::{MockBackend, Reply};
use harness::server::TestServer;
use serde_json::json;

const VERTEX_ERROR: &str = r#"[{"error":{"code":400,"message":"Please ensure that function call turn comes immediately after a user turn","status":"INVALID_ARGUMENT"}}]"#;

#[tokio::test]
async fn backend_rejection_is_relayed_verbatim() {
    let mock = MockBackend::start(Reply::Reject(StatusCode::BAD_REQUEST, VERTEX_ERROR)).await.unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.base_url()).build()).await.unwrap();

    let resp = server
        .chat(&json!({"model": "gemini-2.5-pro", "messages": [{"role": "user", "content": "hi"}], "stream": true}))
        .await;

    assert_eq!(resp.status(), 400);
    assert_eq!(resp.headers()["content-type"], "application/json");
    assert_eq!(resp.text().await.unwrap(), VERTEX_ERROR);
}

#[tokio::test]
async fn backend_server_error_is_not_retried() {
    let mock = MockBackend::start(Reply::Reject(StatusCode::SERVICE_UNAVAILABLE, r#"{"error":"overloaded"}"#))
        .await
        .unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.base_url()).build()).await.unwrap();

    let resp = server.chat(&json!({"model": "m", "messages": []})).await;

    assert_eq!(resp.status(), 503);
    assert_eq!(resp.text().await.unwrap(), r#"{"error":"overloaded"}"#);
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn malformed_body_is_an_internal_error() {
    let mock = MockBackend::start(Reply::Stream(vec![])).await.unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.base_url()).build()).await.unwrap();

    let resp = server
        .client()
        .post(server.url("/v1/chat/completions"))
        .header("content-type", "application/json")
        .body("{\"model\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert!(body["error"]["message"].as_str().unwrap().contains("EOF"));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn unreachable_backend_is_a_bad_gateway() {
    let closed = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let config = ConfigBuilder::new(&format!("http://{closed}/v1")).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.chat(&json!({"model": "m", "messages": []})).await;

    assert_eq!(resp.status(), 502);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["type"], "upstream_error");
}
