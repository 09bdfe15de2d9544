//! Handlers for liveness and readiness endpoints.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, LivenessResponse, ReadinessChecks, ReadinessResponse};
use crate::config::FailurePolicy;
use crate::state::AppState;

/// Liveness probe. Always 200 while the process serves requests.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe with component checks.
///
/// # Endpoint
///
/// `GET /ready`
///
/// # Response Codes
///
/// - **200 OK**: All required components healthy
/// - **503 Service Unavailable**: One or more required components failing
///
/// The counter store is only required under [`FailurePolicy::Closed`]. With
/// the fail-open policy the limiters keep admitting traffic during a store
/// outage, so the check is reported as `degraded` without failing readiness.
///
/// # Response
///
/// ```json
/// {
///   "status": "ready",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "counter_store": { "status": "ok", "message": "Reachable" },
///     "audit_queue": { "status": "ok", "message": "Capacity: 10000" }
///   }
/// }
/// ```
pub async fn ready_handler(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let checks = ReadinessChecks {
        database: check_database(&state).await,
        counter_store: check_counter_store(&state).await,
        audit_queue: check_audit_queue(&state),
    };

    let counter_store_required = state.failure_policy == FailurePolicy::Closed;
    let all_healthy = checks.database.is_ok()
        && checks.audit_queue.is_ok()
        && (checks.counter_store.is_ok() || !counter_store_required);

    let response = ReadinessResponse {
        status: if all_healthy { "ready" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        checks,
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match sqlx::query("SELECT 1").execute(state.pool.as_ref()).await {
        Ok(_) => CheckStatus::ok("Connected"),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness: database check failed");
            CheckStatus::error(format!("Database error: {}", e))
        }
    }
}

async fn check_counter_store(state: &AppState) -> CheckStatus {
    let reachable = tokio::time::timeout(
        state.counter_store_timeout,
        state.counter_store.health_check(),
    )
    .await;

    let message = match reachable {
        Ok(true) => return CheckStatus::ok("Reachable"),
        Ok(false) => "Counter store unreachable".to_string(),
        Err(_) => format!(
            "Counter store did not answer within {:?}",
            state.counter_store_timeout
        ),
    };

    tracing::warn!(policy = ?state.failure_policy, "Readiness: {}", message);
    match state.failure_policy {
        FailurePolicy::Open => CheckStatus::degraded(message),
        FailurePolicy::Closed => CheckStatus::error(message),
    }
}

/// The queue counts as healthy while its worker is alive; a full queue only
/// drops entries, so it is reported but not fatal.
fn check_audit_queue(state: &AppState) -> CheckStatus {
    if state.audit_recorder.is_closed() {
        CheckStatus::error("Audit queue is closed")
    } else {
        CheckStatus::ok(format!("Capacity: {}", state.audit_recorder.capacity()))
    }
}
