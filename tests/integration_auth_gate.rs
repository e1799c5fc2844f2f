//! Router-level authentication and authorization checks.
//!
//! These requests are all rejected by the gate before any handler work
//! happens, so the lazy (never-connected) test pool is sufficient.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use cohortly::modules::users::model::Role;
use cohortly::router::init_router;

use common::{make_token, test_state};

async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let app = init_router(test_state());
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value =
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_missing_token_is_unauthenticated() {
    let (status, body) = send(get("/api/users", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_malformed_bearer_token_is_unauthenticated() {
    let (status, _) = send(get("/api/users", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_authorization_is_unauthenticated() {
    let request = Request::builder()
        .method("GET")
        .uri("/api/users")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_student_cannot_reach_staff_routes() {
    let token = make_token(Some(1), Role::Student);

    let (status, body) = send(get("/api/users", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().unwrap().contains("Access denied"));
}

#[tokio::test]
async fn test_teacher_cannot_manage_courses() {
    let token = make_token(Some(2), Role::Teacher);

    let (status, _) = send(post_json(
        "/api/courses",
        Some(&token),
        serde_json::json!({ "title": "Algebra 101", "description": "Basics" }),
    ))
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_student_cannot_author_quizzes() {
    let token = make_token(Some(3), Role::Student);

    let (status, _) = send(post_json(
        "/api/quizzes/1/questions",
        Some(&token),
        serde_json::json!({ "text": "2+2?", "answers": [] }),
    ))
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_cannot_use_student_routes() {
    let token = make_token(Some(4), Role::Admin);

    let (status, _) = send(get("/api/batches/student/courses", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_superadmin_token_without_subject_passes_staff_gate() {
    // A superadmin token carries no user id; the staff gate still admits it
    // and the request only fails once the handler needs the database.
    let token = make_token(None, Role::Superadmin);

    let (status, _) = send(get("/api/users", Some(&token))).await;
    assert_ne!(status, StatusCode::UNAUTHORIZED);
    assert_ne!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_teacher_cannot_impersonate_student_submission_route() {
    let token = make_token(Some(5), Role::Teacher);

    let (status, _) = send(post_json(
        "/api/lessons/complete",
        Some(&token),
        serde_json::json!({ "lesson_id": 1 }),
    ))
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
