mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;

#[tokio::test]
async fn health_check_needs_no_credentials() {
    let app = TestApp::spawn();

    let response = app
        .call_with_authorization(Method::GET, "/health", None, None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["service"], "board-gateway");
}
