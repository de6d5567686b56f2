use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use taskforge_backend::auth::sign_token;
use taskforge_backend::state::AppState;

/// Helper: build a fresh app router with a clean test AppState.
/// The pool is `connect_lazy` — no real database connection required, so
/// only paths that respond before issuing SQL are exercised here.
fn app() -> axum::Router {
    let state = AppState::new_test();
    taskforge_backend::create_router(state)
}

/// Matches the secret baked into `AppState::new_test`.
const TEST_SECRET: &str = "test-secret";

fn bearer() -> String {
    format!("Bearer {}", sign_token(TEST_SECRET, Uuid::new_v4()).unwrap())
}

/// Helper: collect a response body into a serde_json::Value.
async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, auth: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
//  GET /health
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn health_returns_200_with_fields() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], "0.1.0");
    assert_eq!(json["app"], "TaskForge");
    assert!(json["uptime_seconds"].is_u64());
    assert!(json["providers"].is_array());
}

// ═══════════════════════════════════════════════════════════════════════════
//  Bearer auth matrix — every failure mode is the same 401
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn tasks_without_token_returns_401() {
    let response = app()
        .oneshot(Request::builder().uri("/tasks").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tasks_with_malformed_header_returns_401() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/tasks")
                .header("authorization", "Token abc123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tasks_with_garbage_token_returns_401() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/tasks")
                .header("authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tasks_with_wrong_key_token_returns_401() {
    let token = sign_token("some-other-secret", Uuid::new_v4()).unwrap();
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/tasks")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_key_and_missing_token_are_indistinguishable() {
    let missing = app()
        .oneshot(Request::builder().uri("/tasks").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let token = sign_token("some-other-secret", Uuid::new_v4()).unwrap();
    let wrong = app()
        .oneshot(
            Request::builder()
                .uri("/tasks")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(missing.status(), wrong.status());
    assert_eq!(body_json(missing).await, body_json(wrong).await);
}

#[tokio::test]
async fn suggest_without_token_returns_401() {
    let body = json!({ "title": "t", "description": "d" });
    let response = app()
        .oneshot(json_request("POST", "/tasks/suggest", None, &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ═══════════════════════════════════════════════════════════════════════════
//  Input validation — rejected before any database work
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn create_task_with_empty_title_returns_400() {
    let body = json!({ "title": "  ", "description": "x" });
    let response = app()
        .oneshot(json_request("POST", "/tasks", Some(&bearer()), &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_task_with_empty_description_returns_400() {
    let body = json!({ "title": "x", "description": "" });
    let response = app()
        .oneshot(json_request("POST", "/tasks", Some(&bearer()), &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_task_with_invalid_id_returns_400() {
    let body = json!({ "title": "x", "description": "y" });
    let response = app()
        .oneshot(json_request(
            "PUT",
            "/tasks/not-a-uuid",
            Some(&bearer()),
            &body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid task id");
}

#[tokio::test]
async fn delete_task_with_invalid_id_returns_400() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/tasks/12345")
                .header("authorization", bearer())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_missing_fields_returns_400() {
    let body = json!({ "email": "", "password": "" });
    let response = app()
        .oneshot(json_request("POST", "/auth/login", None, &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_with_missing_fields_returns_400() {
    let body = json!({ "username": "alice", "email": "", "password": "pw" });
    let response = app()
        .oneshot(json_request("POST", "/auth/register", None, &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ═══════════════════════════════════════════════════════════════════════════
//  POST /tasks/suggest — deterministic fallback end to end
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn suggest_with_token_and_no_provider_returns_fallback() {
    let body = json!({ "title": "Write spec", "description": "draft v1" });
    let response = app()
        .oneshot(json_request("POST", "/tasks/suggest", Some(&bearer()), &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let suggestions = json["suggestions"].as_array().unwrap();
    assert!(!suggestions.is_empty());
    assert!(suggestions.len() <= 5);
    // The no-credential fallback references the submitted title.
    assert!(suggestions[0].as_str().unwrap().contains("Write spec"));
}

#[tokio::test]
async fn suggest_with_empty_title_returns_400() {
    let body = json!({ "title": " ", "description": "d" });
    let response = app()
        .oneshot(json_request("POST", "/tasks/suggest", Some(&bearer()), &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ═══════════════════════════════════════════════════════════════════════════
//  404 for unknown routes
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
