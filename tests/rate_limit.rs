mod common;

use axum::http::StatusCode;
use lab_platform::config::LimitSettings;
use serde_json::json;
use sqlx::PgPool;
use std::time::Duration;

fn limited_config(limit: u64) -> lab_platform::config::Config {
    let mut config = common::test_config();
    config.rate_limit = LimitSettings {
        limit,
        window: Duration::from_secs(60),
    };
    config
}

#[sqlx::test]
async fn test_requests_over_limit_are_rejected(pool: PgPool) {
    let (server, _rx) = common::test_server_with(pool, limited_config(3));
    let (xff, ip) = common::forwarded_for("203.0.113.9");

    for expected_remaining in ["2", "1", "0"] {
        let response = server
            .get("/api/v1/auth/me")
            .add_header(xff.clone(), ip.clone())
            .await;
        // Admitted, then refused by authentication.
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_header("x-ratelimit-limit", "3");
        response.assert_header("x-ratelimit-remaining", expected_remaining);
    }

    let rejected = server
        .get("/api/v1/auth/me")
        .add_header(xff.clone(), ip.clone())
        .await;
    rejected.assert_status(StatusCode::TOO_MANY_REQUESTS);
    rejected.assert_json(&json!({ "error": "Rate limit exceeded" }));
    rejected.assert_header("x-ratelimit-remaining", "0");

    // Public login route shares the same window.
    server
        .post("/api/v1/auth/login")
        .add_header(xff, ip)
        .json(&json!({ "username": "alice", "password": "whatever" }))
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[sqlx::test]
async fn test_clients_have_separate_windows(pool: PgPool) {
    let (server, _rx) = common::test_server_with(pool, limited_config(1));
    let (xff, first) = common::forwarded_for("203.0.113.10");
    let (_, second) = common::forwarded_for("203.0.113.11");

    server
        .get("/api/v1/auth/me")
        .add_header(xff.clone(), first.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/api/v1/auth/me")
        .add_header(xff.clone(), first)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    server
        .get("/api/v1/auth/me")
        .add_header(xff, second)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
async fn test_health_endpoints_are_not_limited(pool: PgPool) {
    let (server, _rx) = common::test_server_with(pool, limited_config(1));

    for _ in 0..3 {
        server.get("/health").await.assert_status_ok();
    }
}
