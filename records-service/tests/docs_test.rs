mod common;

use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn index_lists_every_route() {
    let app = TestApp::without_database();

    let (status, content_type, body) = app.get_text("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    for path in [
        "/get/unisys/payroll",
        "/get/ibm/shipping",
        "/update/unisys/payroll",
        "/update/ibm/shipping",
        "/logs",
        "/health",
    ] {
        assert!(body.contains(path), "missing {} in docs page", path);
    }
    assert!(body.contains("POST"));
}

#[tokio::test]
async fn metrics_endpoint_returns_prometheus_format() {
    let app = TestApp::spawn();

    let (status, content_type, body) = app.get_text("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert!(
        body.is_empty() || body.contains('#') || body.contains('_'),
        "Unexpected metrics format: {}",
        body
    );
}
