//! Integration tests for the HTTP endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use pistream_core::StreamConfig;
use pistream_server::handlers::HealthResponse;
use pistream_server::router::build_router;
use pistream_server::state::AppState;
use tower::ServiceExt;

async fn body_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX).await.unwrap().to_vec()
}

#[tokio::test]
async fn test_index_returns_html() {
    let router = build_router(Arc::new(AppState::default()));

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(content_type.contains("text/html"));

    let html = String::from_utf8(body_bytes(response.into_body()).await).unwrap();
    assert!(html.contains("/ws"));
    assert!(html.contains("current_pi"));
}

#[tokio::test]
async fn test_health_reports_counters() {
    let state = Arc::new(AppState::default());
    let _live = state.begin_session();
    let router = build_router(Arc::clone(&state));

    let response = router
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse =
        serde_json::from_slice(&body_bytes(response.into_body()).await).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.active_sessions, 1);
    assert_eq!(health.total_sessions, 1);
    assert_eq!(health.initial_precision, 100_000);
}

#[tokio::test]
async fn test_health_reflects_configured_precision() {
    let config = StreamConfig::parse("series:\n  initial_precision: 777\n").unwrap();
    let router = build_router(Arc::new(AppState::new(&config)));

    let response = router
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let health: HealthResponse =
        serde_json::from_slice(&body_bytes(response.into_body()).await).unwrap();
    assert_eq!(health.initial_precision, 777);
    assert_eq!(health.active_sessions, 0);
}

#[tokio::test]
async fn test_ws_without_upgrade_is_rejected() {
    let router = build_router(Arc::new(AppState::default()));

    let response = router
        .oneshot(Request::get("/ws").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let router = build_router(Arc::new(AppState::default()));

    let response = router
        .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
