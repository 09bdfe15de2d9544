//! HTTP request/response tracing middleware.

use axum::{body::Body, http::Request};
use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};
use uuid::Uuid;

type MakeRequestSpan = fn(&Request<Body>) -> Span;

/// Creates a tracing middleware for HTTP requests.
///
/// Every request gets an `INFO` span carrying the method, the path and a
/// fresh request id, so the audit summary line and any handler logs can be
/// correlated. Responses are logged at `INFO` with status and latency in
/// milliseconds.
///
/// # Example Logs
///
/// ```text
/// INFO request{method=POST path=/api/v1/auth/login request_id=4f1c...}: finished processing request latency=12 ms status=200
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, MakeRequestSpan> {
    TraceLayer::new_for_http()
        .make_span_with(make_span as MakeRequestSpan)
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}

fn make_span(req: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %Uuid::new_v4(),
    )
}
