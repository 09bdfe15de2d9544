//! API route configuration.
//!
//! Routes are split by authentication requirement; [`crate::routes`] nests
//! both under `/api/v1` behind the request limiter.

use crate::api::handlers::{
    approve_request_handler, audit_logs_handler, cancel_request_handler, create_request_handler,
    create_user_handler, get_request_handler, get_user_handler, list_requests_handler,
    list_users_handler, login_handler, logout_handler, me_handler, reject_request_handler,
    update_user_handler,
};
use crate::api::middleware::login_guard;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Routes reachable without a bearer token.
///
/// - `POST /auth/login` - behind the failed-login guard
pub fn public_routes(state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/auth/login",
        post(login_handler).route_layer(middleware::from_fn_with_state(
            state.login_limiter.clone(),
            login_guard::layer,
        )),
    )
}

/// Routes that require Bearer token authentication.
///
/// # Endpoints
///
/// - `POST  /auth/logout`                       - Revoke the presented token
/// - `GET   /auth/me`                           - Current user
/// - `GET   /users`                             - List users (admin)
/// - `POST  /users`                             - Create a user (admin)
/// - `GET   /users/{id}`                        - User detail (admin or self)
/// - `PATCH /users/{id}`                        - Update a user (admin)
/// - `GET   /resource-requests`                 - List requests
/// - `POST  /resource-requests`                 - File a request
/// - `GET   /resource-requests/{id}`            - Request detail
/// - `POST  /resource-requests/{id}/approve`    - Approve (admin)
/// - `POST  /resource-requests/{id}/reject`     - Reject (admin)
/// - `POST  /resource-requests/{id}/cancel`     - Cancel (requester)
/// - `GET   /audit-logs`                        - Audit trail (admin)
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout_handler))
        .route("/auth/me", get(me_handler))
        .route("/users", get(list_users_handler).post(create_user_handler))
        .route(
            "/users/{id}",
            get(get_user_handler).patch(update_user_handler),
        )
        .route(
            "/resource-requests",
            get(list_requests_handler).post(create_request_handler),
        )
        .route("/resource-requests/{id}", get(get_request_handler))
        .route(
            "/resource-requests/{id}/approve",
            post(approve_request_handler),
        )
        .route(
            "/resource-requests/{id}/reject",
            post(reject_request_handler),
        )
        .route(
            "/resource-requests/{id}/cancel",
            post(cancel_request_handler),
        )
        .route("/audit-logs", get(audit_logs_handler))
}
