use axum::http::StatusCode;
use serde_json::json;

use crate::tests::helper;

#[tokio::test]
async fn test_health() {
    let mut app = helper::setup_test_app();

    let (status_code, body) = helper::get_raw(&mut app, "/api/health", None).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(json!({ "status": "healthy" }), body);
}

#[tokio::test]
async fn test_unknown_route() {
    let mut app = helper::setup_test_app();

    let (status_code, body) = helper::get_raw(&mut app, "/api/unknown", None).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(json!({ "detail": "Not Found" }), body);

    let (status_code, _) = helper::get_raw(&mut app, "/", None).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
}
