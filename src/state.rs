//! Shared application state injected into every handler and middleware.

use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::api::middleware::{AuditRecorder, ClientIpConfig};
use crate::application::services::{
    AuditService, AuthService, LoginAttemptLimiter, RequestLimiter, ResourceRequestService,
    UserService,
};
use crate::config::{Config, FailurePolicy};
use crate::domain::entities::AuditLogEntry;
use crate::infrastructure::counter::CounterStore;
use crate::infrastructure::persistence::{
    PgAuditRepository, PgResourceRequestRepository, PgTokenRepository, PgUserRepository,
};

/// Application state shared across all handlers.
///
/// Cheap to clone: every field is an `Arc` or a channel handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<PgPool>,
    pub counter_store: Arc<dyn CounterStore>,
    pub auth_service: Arc<AuthService<PgTokenRepository, PgUserRepository>>,
    pub user_service: Arc<UserService<PgUserRepository>>,
    pub resource_request_service: Arc<ResourceRequestService<PgResourceRequestRepository>>,
    pub audit_service: Arc<AuditService<PgAuditRepository>>,
    pub request_limiter: Arc<RequestLimiter>,
    pub login_limiter: Arc<LoginAttemptLimiter>,
    pub audit_recorder: AuditRecorder,
    pub client_ip: ClientIpConfig,
    /// Shared by both limiters; also decides whether `/ready` depends on the counter store.
    pub failure_policy: FailurePolicy,
    pub counter_store_timeout: Duration,
}

impl AppState {
    /// Wires repositories, services and limiters together.
    ///
    /// The receiving half of `audit_sender` belongs to the audit worker.
    pub fn new(
        pool: Arc<PgPool>,
        counter_store: Arc<dyn CounterStore>,
        audit_sender: mpsc::Sender<AuditLogEntry>,
        config: &Config,
    ) -> Self {
        let user_repository = Arc::new(PgUserRepository::new(pool.clone()));
        let token_repository = Arc::new(PgTokenRepository::new(pool.clone()));
        let request_repository = Arc::new(PgResourceRequestRepository::new(pool.clone()));
        let audit_repository = Arc::new(PgAuditRepository::new(pool.clone()));

        let auth_service = Arc::new(AuthService::new(
            token_repository,
            user_repository.clone(),
            config.token_signing_secret.clone(),
            config.token_ttl_hours,
        ));

        let request_limiter = Arc::new(RequestLimiter::new(
            counter_store.clone(),
            config.rate_limit,
            config.failure_policy,
            config.counter_store_timeout,
        ));
        let login_limiter = Arc::new(LoginAttemptLimiter::new(
            counter_store.clone(),
            config.login_limit,
            config.failure_policy,
            config.counter_store_timeout,
        ));

        let audit_recorder = AuditRecorder::new(
            audit_sender,
            config.audit_excluded_paths.iter().cloned(),
            config.audit_max_body_bytes,
        );

        Self {
            pool,
            counter_store,
            auth_service,
            user_service: Arc::new(UserService::new(user_repository)),
            resource_request_service: Arc::new(ResourceRequestService::new(request_repository)),
            audit_service: Arc::new(AuditService::new(audit_repository)),
            request_limiter,
            login_limiter,
            audit_recorder,
            client_ip: ClientIpConfig {
                behind_proxy: config.behind_proxy,
            },
            failure_policy: config.failure_policy,
            counter_store_timeout: config.counter_store_timeout,
        }
    }
}
