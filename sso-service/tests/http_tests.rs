mod common;

use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use serde_json::Value;
use tower::ServiceExt;

impl TestApp {
    async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request");

        send(self, request).await
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .router()
        .oneshot(request)
        .await
        .expect("Failed to execute request");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).expect("Failed to parse response");

    (status, body)
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post_json(
            "/api/auth/register",
            json!({ "email": "alice@example.com", "password": "correct horse" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status_code"], 201);
    assert!(body["data"]["user_id"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_register_duplicate_is_conflict() {
    let app = TestApp::spawn().await;
    let payload = json!({ "email": "alice@example.com", "password": "correct horse" });

    app.post_json("/api/auth/register", payload.clone()).await;
    let (status, body) = app.post_json("/api/auth/register", payload).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_register_invalid_email() {
    let app = TestApp::spawn().await;

    let (status, _) = app
        .post_json(
            "/api/auth/register",
            json!({ "email": "alice", "password": "correct horse" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;
    app.post_json(
        "/api/auth/register",
        json!({ "email": "alice@example.com", "password": "correct horse" }),
    )
    .await;

    let (status, body) = app
        .post_json(
            "/api/auth/login",
            json!({ "email": "alice@example.com", "password": "correct horse", "app_id": 1 }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].as_str().unwrap().contains('.'));
}

#[tokio::test]
async fn test_login_failures_share_one_response() {
    let app = TestApp::spawn().await;
    app.post_json(
        "/api/auth/register",
        json!({ "email": "alice@example.com", "password": "correct horse" }),
    )
    .await;

    let (wrong_status, wrong_body) = app
        .post_json(
            "/api/auth/login",
            json!({ "email": "alice@example.com", "password": "wrong", "app_id": 1 }),
        )
        .await;
    let (unknown_status, unknown_body) = app
        .post_json(
            "/api/auth/login",
            json!({ "email": "nobody@example.com", "password": "correct horse", "app_id": 1 }),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_login_requires_application() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post_json(
            "/api/auth/login",
            json!({ "email": "alice@example.com", "password": "pw", "app_id": 0 }),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["data"]["message"], "Application id is required");
}
