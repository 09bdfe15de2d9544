//! Panic recovery.

use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::AppError;

pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Turns a panicking handler into a 500 with the standard error envelope.
///
/// The panic message is logged and never sent to the client.
pub fn layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = %message, "Handler panicked");

    AppError::internal("Internal server error", json!({})).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        async fn boom() -> &'static str {
            panic!("secret detail")
        }

        let app = Router::new().route("/boom", get(boom)).layer(layer());

        let response = TestServer::new(app).unwrap().get("/boom").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["error"]["code"], "internal_error");
        assert!(!response.text().contains("secret detail"));
    }
}
