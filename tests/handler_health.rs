mod common;

use axum::http::StatusCode;
use lab_platform::config::{Config, FailurePolicy};
use sqlx::PgPool;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

#[sqlx::test]
async fn test_liveness(pool: PgPool) {
    let (server, _rx) = common::test_server(pool);

    let response = server.get("/health").await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[sqlx::test]
async fn test_readiness_all_ok(pool: PgPool) {
    let (server, _rx) = common::test_server(pool);

    let response = server.get("/ready").await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "ready");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["counter_store"]["status"], "ok");
    assert_eq!(json["checks"]["audit_queue"]["status"], "ok");
}

#[sqlx::test]
async fn test_readiness_degraded_without_audit_worker(pool: PgPool) {
    let (server, rx) = common::test_server(pool);
    drop(rx);

    let response = server.get("/ready").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["audit_queue"]["status"], "error");
    assert_eq!(json["checks"]["database"]["status"], "ok");
}

#[sqlx::test]
async fn test_global_headers(pool: PgPool) {
    let (server, _rx) = common::test_server(pool);

    let response = server.get("/health").await;

    response.assert_header("x-content-type-options", "nosniff");
    response.assert_header("x-frame-options", "DENY");
    // Outside the API nest: no limiter headers.
    assert!(response.headers().get("x-ratelimit-limit").is_none());
}

#[sqlx::test]
async fn test_unknown_route(pool: PgPool) {
    let (server, _rx) = common::test_server(pool);

    server.get("/nope").await.assert_status_not_found();
}

#[sqlx::test]
async fn test_readiness_counter_store_down_fail_open(pool: PgPool) {
    let (server, _rx) = common::test_server_with_store(
        pool,
        common::test_config(),
        Arc::new(common::UnreachableCounterStore),
    );

    let response = server.get("/ready").await;

    // Limiters keep admitting, so the instance stays in service
    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "ready");
    assert_eq!(json["checks"]["counter_store"]["status"], "degraded");
    assert_eq!(json["checks"]["database"]["status"], "ok");

    // And API traffic is still admitted
    server
        .post("/api/v1/auth/login")
        .json(&serde_json::json!({ "username": "nobody", "password": "wrong-password" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
async fn test_readiness_counter_store_down_fail_closed(pool: PgPool) {
    let config = Config {
        failure_policy: FailurePolicy::Closed,
        ..common::test_config()
    };
    let (server, _rx) =
        common::test_server_with_store(pool, config, Arc::new(common::UnreachableCounterStore));

    let response = server.get("/ready").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["counter_store"]["status"], "error");
}

#[sqlx::test]
async fn test_readiness_counter_store_timeout(pool: PgPool) {
    let config = Config {
        failure_policy: FailurePolicy::Closed,
        counter_store_timeout: Duration::from_millis(50),
        ..common::test_config()
    };
    let (server, _rx) =
        common::test_server_with_store(pool, config, Arc::new(common::HangingCounterStore));

    let response = tokio::time::timeout(Duration::from_secs(5), server.get("/ready").into_future())
        .await
        .expect("/ready must not hang on a stalled counter store");

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<serde_json::Value>();
    let message = json["checks"]["counter_store"]["message"].as_str().unwrap();
    assert!(message.contains("did not answer"));
}
