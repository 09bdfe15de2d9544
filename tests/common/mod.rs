#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use lab_platform::config::{Config, FailurePolicy, LimitSettings};
use lab_platform::domain::entities::{AuditLogEntry, NewUser, Role};
use lab_platform::domain::repositories::UserRepository;
use lab_platform::infrastructure::counter::{
    CounterError, CounterResult, CounterStore, MemoryCounterStore,
};
use lab_platform::infrastructure::persistence::PgUserRepository;
use lab_platform::routes::build_router;
use lab_platform::state::AppState;
use lab_platform::utils::password::hash_password;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const PASSWORD: &str = "correct horse battery";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/test".to_string(),
        redis_url: None,
        listen_addr: "127.0.0.1:0".to_string(),
        log_level: "info".to_string(),
        log_format: "text".to_string(),
        behind_proxy: true,
        token_signing_secret: "test-signing-secret".to_string(),
        token_ttl_hours: 24,
        rate_limit: LimitSettings {
            limit: 100,
            window: Duration::from_secs(60),
        },
        login_limit: LimitSettings {
            limit: 5,
            window: Duration::from_secs(900),
        },
        failure_policy: FailurePolicy::Open,
        counter_store_timeout: Duration::from_millis(250),
        audit_queue_capacity: 100,
        audit_max_body_bytes: 65_536,
        audit_excluded_paths: vec!["/health".to_string(), "/ready".to_string()],
        cors_allowed_origins: vec!["*".to_string()],
        hsts_enabled: false,
        db_max_connections: 5,
        db_connect_timeout: 5,
        db_idle_timeout: 600,
        db_max_lifetime: 1800,
    }
}

pub fn create_test_state(
    pool: PgPool,
    config: &Config,
) -> (AppState, mpsc::Receiver<AuditLogEntry>) {
    create_test_state_with_store(pool, config, Arc::new(MemoryCounterStore::new()))
}

pub fn create_test_state_with_store(
    pool: PgPool,
    config: &Config,
    counter_store: Arc<dyn CounterStore>,
) -> (AppState, mpsc::Receiver<AuditLogEntry>) {
    let (tx, rx) = mpsc::channel(config.audit_queue_capacity);
    let state = AppState::new(Arc::new(pool), counter_store, tx, config);
    (state, rx)
}

/// Full router over a caller-supplied counter store.
pub fn test_server_with_store(
    pool: PgPool,
    config: Config,
    counter_store: Arc<dyn CounterStore>,
) -> (TestServer, mpsc::Receiver<AuditLogEntry>) {
    let (state, rx) = create_test_state_with_store(pool, &config, counter_store);
    let server = TestServer::new(build_router(state, &config)).unwrap();
    (server, rx)
}

/// Counter store whose backend is down: every call fails.
pub struct UnreachableCounterStore;

#[async_trait]
impl CounterStore for UnreachableCounterStore {
    async fn increment(&self, _key: &str) -> CounterResult<i64> {
        Err(CounterError::ConnectionError("connection refused".to_string()))
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> CounterResult<()> {
        Err(CounterError::ConnectionError("connection refused".to_string()))
    }

    async fn expire_if_persistent(&self, _key: &str, _ttl: Duration) -> CounterResult<bool> {
        Err(CounterError::ConnectionError("connection refused".to_string()))
    }

    async fn get(&self, _key: &str) -> CounterResult<Option<i64>> {
        Err(CounterError::ConnectionError("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> CounterResult<()> {
        Err(CounterError::ConnectionError("connection refused".to_string()))
    }

    async fn increment_with_expiry(&self, _key: &str, _ttl: Duration) -> CounterResult<i64> {
        Err(CounterError::ConnectionError("connection refused".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

/// Counter store that accepts connections but never answers a health check.
pub struct HangingCounterStore;

#[async_trait]
impl CounterStore for HangingCounterStore {
    async fn increment(&self, _key: &str) -> CounterResult<i64> {
        std::future::pending().await
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> CounterResult<()> {
        std::future::pending().await
    }

    async fn expire_if_persistent(&self, _key: &str, _ttl: Duration) -> CounterResult<bool> {
        std::future::pending().await
    }

    async fn get(&self, _key: &str) -> CounterResult<Option<i64>> {
        std::future::pending().await
    }

    async fn delete(&self, _key: &str) -> CounterResult<()> {
        std::future::pending().await
    }

    async fn increment_with_expiry(&self, _key: &str, _ttl: Duration) -> CounterResult<i64> {
        std::future::pending().await
    }

    async fn health_check(&self) -> bool {
        std::future::pending().await
    }
}

/// Full router (every global and group layer) over a fresh state.
pub fn test_server_with(
    pool: PgPool,
    config: Config,
) -> (TestServer, mpsc::Receiver<AuditLogEntry>) {
    let (state, rx) = create_test_state(pool, &config);
    let server = TestServer::new(build_router(state, &config)).unwrap();
    (server, rx)
}

pub fn test_server(pool: PgPool) -> (TestServer, mpsc::Receiver<AuditLogEntry>) {
    test_server_with(pool, test_config())
}

pub async fn create_test_user(pool: &PgPool, username: &str, role: Role) -> i64 {
    let repo = PgUserRepository::new(Arc::new(pool.clone()));
    repo.create(NewUser {
        username: username.to_string(),
        display_name: username.to_string(),
        password_hash: hash_password(PASSWORD).unwrap(),
        role,
    })
    .await
    .unwrap()
    .id
}

/// Logs in through the API and returns the bearer token.
pub async fn login(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/api/v1/auth/login")
        .json(&serde_json::json!({ "username": username, "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    response.json::<serde_json::Value>()["token"]
        .as_str()
        .unwrap()
        .to_string()
}

pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

pub fn forwarded_for(ip: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-forwarded-for"),
        HeaderValue::from_static(ip),
    )
}
