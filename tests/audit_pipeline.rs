mod common;

use axum::http::{HeaderValue, StatusCode, header};
use lab_platform::domain::audit_worker::run_audit_worker;
use lab_platform::domain::entities::{AuditLogEntry, AuditOutcome, Role};
use lab_platform::domain::repositories::{AuditFilter, AuditRepository};
use lab_platform::infrastructure::persistence::PgAuditRepository;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn drain(rx: &mut mpsc::Receiver<AuditLogEntry>) -> Vec<AuditLogEntry> {
    let mut entries = Vec::new();
    while let Ok(entry) = rx.try_recv() {
        entries.push(entry);
    }
    entries
}

#[sqlx::test]
async fn test_health_endpoints_are_not_audited(pool: PgPool) {
    let (server, mut rx) = common::test_server(pool);

    server.get("/health").await.assert_status_ok();
    server.get("/ready").await.assert_status_ok();

    assert!(drain(&mut rx).is_empty());
}

#[sqlx::test]
async fn test_login_body_is_redacted(pool: PgPool) {
    common::create_test_user(&pool, "alice", Role::Member).await;
    let (server, mut rx) = common::test_server(pool);

    let body = json!({ "username": "alice", "password": common::PASSWORD });
    let len = serde_json::to_vec(&body).unwrap().len();
    server
        .post("/api/v1/auth/login")
        .json(&body)
        .add_header(header::CONTENT_LENGTH, HeaderValue::from(len))
        .add_header(header::USER_AGENT, HeaderValue::from_static("audit-test"))
        .await
        .assert_status_ok();

    let entries = drain(&mut rx);
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.action, "POST");
    assert_eq!(entry.resource, "/api/v1/auth/login");
    assert_eq!(entry.user_agent, "audit-test");
    assert_eq!(entry.status, AuditOutcome::Success);
    assert!(entry.request_body.contains("alice"));
    assert!(!entry.request_body.contains(common::PASSWORD));
}

#[sqlx::test]
async fn test_authenticated_identity_is_recorded(pool: PgPool) {
    let user_id = common::create_test_user(&pool, "alice", Role::Member).await;
    let (server, mut rx) = common::test_server(pool);
    let token = common::login(&server, "alice").await;
    drain(&mut rx);

    server
        .get("/api/v1/auth/me")
        .add_header(header::AUTHORIZATION, common::bearer(&token))
        .await
        .assert_status_ok();

    let entries = drain(&mut rx);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user_id, user_id.to_string());
    assert_eq!(entries[0].username, "alice");
}

#[sqlx::test]
async fn test_rejections_are_audited_as_failures(pool: PgPool) {
    let (server, mut rx) = common::test_server(pool);

    server
        .get("/api/v1/auth/me")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let entries = drain(&mut rx);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, AuditOutcome::Failure);
    assert_eq!(entries[0].status_code, 401);
    assert_eq!(entries[0].user_id, "");
}

#[sqlx::test]
async fn test_worker_persists_entries(pool: PgPool) {
    let (server, rx) = common::test_server(pool.clone());
    let repository = Arc::new(PgAuditRepository::new(Arc::new(pool)));
    let worker = tokio::spawn(run_audit_worker(rx, repository.clone()));

    server
        .get("/api/v1/auth/me")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let filter = AuditFilter::new(0, 10);
    let mut persisted = 0;
    for _ in 0..50 {
        persisted = repository.count(filter.clone()).await.unwrap();
        if persisted > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(persisted, 1);

    worker.abort();
}
