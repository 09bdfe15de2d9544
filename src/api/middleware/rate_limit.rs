//! Fixed-window rate limiting middleware.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::middleware::client_ip::ClientIp;
use crate::api::middleware::rejection::Rejection;
use crate::application::services::{Admission, RequestLimiter};

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Admits or rejects a request by client IP.
///
/// # Response Headers
///
/// - `X-RateLimit-Limit` - requests allowed per window
/// - `X-RateLimit-Remaining` - requests left in the current window, never negative
///
/// Requests over the limit receive `429 Too Many Requests` with
/// `{"error":"Rate limit exceeded"}` and never reach the handler.
///
/// # Example
///
/// ```rust,ignore
/// let api = Router::new()
///     .route("/auth/login", post(login_handler))
///     .layer(middleware::from_fn_with_state(limiter, rate_limit::layer));
/// ```
pub async fn layer(
    State(limiter): State<Arc<RequestLimiter>>,
    client_ip: ClientIp,
    req: Request,
    next: Next,
) -> Response {
    let admission = limiter.admit(&client_ip.key()).await;

    let mut response = if admission.allowed {
        next.run(req).await
    } else {
        tracing::info!(client_ip = %client_ip, path = %req.uri().path(), "Request rejected by rate limiter");
        Rejection::RateLimited.into_response()
    };

    apply_headers(response.headers_mut(), &admission);
    response
}

fn apply_headers(headers: &mut HeaderMap, admission: &Admission) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(admission.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(admission.remaining()));
}
