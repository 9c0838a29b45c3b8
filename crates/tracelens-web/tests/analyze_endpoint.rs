//! End-to-end tests for the analyze endpoint against a mocked inference API.

use serde_json::{json, Value};
use tracelens_core::InferenceConfig;
use tracelens_llm::InferenceClient;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ZERO_DIV_TRACE: &str = "Traceback (most recent call last):\n  File \"[REDACTED_HOME]/nb/cell.py\", line 1, in <module>\n    x=1/0\nZeroDivisionError: division by zero";

/// Start the endpoint on an ephemeral port, relaying to `upstream`.
async fn spawn_endpoint(upstream: &MockServer) -> String {
    let config = InferenceConfig::new("gsk_test")
        .unwrap()
        .with_completions_url(format!("{}/openai/v1/chat/completions", upstream.uri()));
    let client = InferenceClient::new(config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        tracelens_web::serve(listener, client).await.unwrap();
    });

    format!("http://{}", addr)
}

fn completion(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": text } }]
    }))
}

#[tokio::test]
async fn test_analyze_returns_explanation() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(body_string_contains("ZeroDivisionError"))
        .and(body_string_contains("x=1/0"))
        .respond_with(completion("You divided by zero. Check the divisor first."))
        .expect(1)
        .mount(&upstream)
        .await;

    let base = spawn_endpoint(&upstream).await;
    let response = reqwest::Client::new()
        .post(format!("{}/analyze", base))
        .json(&json!({ "code": "x=1/0", "error": ZERO_DIV_TRACE }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let analysis = body["analysis"].as_str().unwrap();
    assert!(!analysis.is_empty());
    assert_eq!(analysis, "You divided by zero. Check the divisor first.");
}

#[tokio::test]
async fn test_missing_error_is_bad_request_without_upstream_call() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("unused"))
        .expect(0)
        .mount(&upstream)
        .await;

    let base = spawn_endpoint(&upstream).await;
    let response = reqwest::Client::new()
        .post(format!("{}/analyze", base))
        .json(&json!({ "code": "x=1/0" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].as_str().unwrap().contains("error"));
}

#[tokio::test]
async fn test_invalid_json_is_bad_request() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("unused"))
        .expect(0)
        .mount(&upstream)
        .await;

    let base = spawn_endpoint(&upstream).await;
    let response = reqwest::Client::new()
        .post(format!("{}/analyze", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&upstream)
        .await;

    let base = spawn_endpoint(&upstream).await;
    let response = reqwest::Client::new()
        .post(format!("{}/analyze", base))
        .json(&json!({ "code": "x=1/0", "error": ZERO_DIV_TRACE }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "upstream");
    assert!(body["message"].as_str().unwrap().contains("overloaded"));
}

#[tokio::test]
async fn test_health_reports_model() {
    let upstream = MockServer::start().await;
    let base = spawn_endpoint(&upstream).await;

    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "llama-3.1-8b-instant");
}
