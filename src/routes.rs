//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`   - Liveness (public)
//! - `GET  /ready`    - Readiness: database, counter store, audit queue (public)
//! - `/api/v1/*`      - REST API behind the per-IP request limiter
//!
//! # Middleware
//!
//! Outermost first:
//!
//! 1. **Path normalization** - trailing slash handling
//! 2. **Panic recovery** - 500 with the error envelope
//! 3. **CORS**
//! 4. **Security headers**
//! 5. **Tracing** - request span with a request id
//! 6. **Client IP** - resolved once, stored in extensions
//! 7. **Audit** - one log line per request, one audit entry per non-excluded request
//!
//! Inside `/api/v1` the request limiter wraps every route, the login guard
//! wraps `POST /auth/login` and authentication wraps the protected routes.

use crate::api;
use crate::api::handlers::{health_handler, ready_handler};
use crate::api::middleware::{
    audit, auth, client_ip, cors, rate_limit, recovery, security_headers, tracing,
};
use crate::config::Config;
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `config` - CORS origins and HSTS toggle
pub fn app_router(state: AppState, config: &Config) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state, config))
}

/// The router without path normalization, which has to wrap the whole
/// service and so cannot be a router layer.
pub fn build_router(state: AppState, config: &Config) -> Router {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .merge(api::routes::public_routes(&state))
        .layer(middleware::from_fn_with_state(
            state.request_limiter.clone(),
            rate_limit::layer,
        ));

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .nest("/api/v1", api_router)
        .layer(middleware::from_fn_with_state(
            state.audit_recorder.clone(),
            audit::layer,
        ))
        .layer(middleware::from_fn_with_state(
            state.client_ip,
            client_ip::layer,
        ))
        .layer(tracing::layer())
        .with_state(state);

    security_headers::apply(router, config.hsts_enabled)
        .layer(cors::layer(&config.cors_allowed_origins))
        .layer(recovery::layer())
}
