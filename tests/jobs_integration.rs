// SPDX-License-Identifier: MIT

//! Integration tests for the scheduled and maintenance job endpoints.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

/// Create a test app with mock dependencies (no GCP required)
fn create_offline_test_app() -> axum::Router {
    use kine_backend::config::Config;
    use kine_backend::db::FirestoreDb;
    use kine_backend::routes::create_router;
    use kine_backend::services::FcmClient;
    use kine_backend::AppState;
    use std::sync::Arc;

    let state = Arc::new(AppState {
        config: Config::test_default(),
        db: FirestoreDb::new_mock(),
        fcm: FcmClient::new_mock(),
    });

    create_router(state)
}

#[tokio::test]
async fn health_check_reports_ok() {
    let app = create_offline_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn expire_appointments_requires_scheduler_header() {
    let app = create_offline_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/jobs/expire-appointments")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn expire_appointments_query_failure_returns_500() {
    let app = create_offline_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/jobs/expire-appointments")
                .header("x-cloudscheduler", "true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // The sweep query is a primary data path; its failure must surface so
    // the scheduler run is marked failed.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn init_device_tokens_requires_scheduler_header() {
    let app = create_offline_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/jobs/init-device-tokens")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn init_device_tokens_failure_returns_500() {
    let app = create_offline_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/jobs/init-device-tokens")
                .header("x-cloudscheduler", "true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
