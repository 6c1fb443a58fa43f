mod common;

use axum::http::{Method, StatusCode};
use common::{sign, TestApp};

#[tokio::test]
async fn missing_header_is_invalid_authorization() {
    let app = TestApp::spawn();

    let response = app
        .call_with_authorization(Method::GET, "/api/v1/users/me", None, None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "invalid_authorization");
}

#[tokio::test]
async fn wrong_scheme_is_invalid_authorization() {
    let app = TestApp::spawn();

    let response = app
        .call_with_authorization(Method::GET, "/api/v1/users/me", Some("Bear xyz"), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "invalid_authorization");
    assert!(app.services.checks().is_empty());
}

#[tokio::test]
async fn extra_header_parts_are_invalid_authorization() {
    let app = TestApp::spawn();
    let header = format!("Bearer {} extra", app.token());

    let response = app
        .call_with_authorization(Method::GET, "/api/v1/users/me", Some(&header), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let app = TestApp::spawn();
    let header = format!("Bearer {}", sign(&app.user_id, -600));

    let response = app
        .call_with_authorization(Method::GET, "/api/v1/users/me", Some(&header), None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["code"], "invalid_token");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = TestApp::spawn();

    let response = app
        .call_with_authorization(
            Method::GET,
            "/api/v1/users/me",
            Some("Bearer not-a-jwt"),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn scheme_match_ignores_case() {
    let app = TestApp::spawn();
    app.services.add_user(&app.user_id, "Ada", "ada@example.com");
    let header = format!("bearer {}", app.token());

    let response = app
        .call_with_authorization(Method::GET, "/api/v1/users/me", Some(&header), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user_id"], app.user_id.as_str());
    assert_eq!(response.body["email"], "ada@example.com");
}
