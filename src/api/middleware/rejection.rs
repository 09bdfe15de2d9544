//! Limiter rejection responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// A request refused by one of the limiters.
///
/// Renders a flat `{"error": "..."}` body with 429, not the [`crate::AppError`]
/// envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    RateLimited,
    LoginLocked,
}

impl Rejection {
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::RateLimited => "Rate limit exceeded",
            Rejection::LoginLocked => "Too many login attempts. Please try again later.",
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": self.message() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flat_body() {
        let response = Rejection::LoginLocked.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            body,
            json!({ "error": "Too many login attempts. Please try again later." })
        );
    }
}
