//! DTOs for liveness and readiness endpoints.

use serde::Serialize;

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Readiness response with component status.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub checks: ReadinessChecks,
}

/// Health status for each dependency.
#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub database: CheckStatus,
    pub counter_store: CheckStatus,
    pub audit_queue: CheckStatus,
}

/// Individual component health status.
#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub status: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckStatus {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok",
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: Some(message.into()),
        }
    }

    /// Failing, but not enough to take the instance out of service.
    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            status: "degraded",
            message: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
