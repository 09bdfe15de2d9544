//! Login lockout guard.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::middleware::client_ip::ClientIp;
use crate::api::middleware::rejection::Rejection;
use crate::application::services::{LockState, LoginAttemptLimiter};

/// Refuses login attempts from a locked-out client.
///
/// Only reads the failure counter. Failures are recorded and cleared by
/// the login handler once the credentials have been checked.
pub async fn layer(
    State(limiter): State<Arc<LoginAttemptLimiter>>,
    client_ip: ClientIp,
    req: Request,
    next: Next,
) -> Response {
    if let LockState::Locked { failures } = limiter.check_allowed(&client_ip.key()).await {
        tracing::warn!(client_ip = %client_ip, failures, "Login attempt refused: locked out");
        return Rejection::LoginLocked.into_response();
    }

    next.run(req).await
}
