//! Handler for the audit trail query endpoint.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::dto::audit_log::{AuditLogItem, AuditLogQuery};
use crate::api::dto::pagination::PagedResponse;
use crate::domain::identity::CurrentUser;
use crate::domain::repositories::AuditFilter;
use crate::error::AppError;
use crate::state::AppState;

/// Returns audit entries, newest first.
///
/// # Endpoint
///
/// `GET /api/v1/audit-logs` (admin)
///
/// # Query Parameters
///
/// - `page`, `page_size` - pagination (defaults 1 and 25)
/// - `user_id` - exact user id; empty string matches anonymous requests
/// - `status` - `success` or `failure`
/// - `from`, `to` - RFC 3339 bounds on `created_at`
///
/// # Errors
///
/// Returns 400 if `from` is after `to`, 403 for non-admin callers.
pub async fn audit_logs_handler(
    State(state): State<AppState>,
    caller: CurrentUser,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<PagedResponse<AuditLogItem>>, AppError> {
    caller.require_admin()?;
    let page = query.pagination.validate()?;

    let filter = AuditFilter::new(page.offset(), page.limit())
        .with_user_id(query.user_id)
        .with_status(query.status)
        .with_date_range(query.date_filter.from, query.date_filter.to);

    let (entries, total) = state.audit_service.list(filter).await?;

    Ok(Json(PagedResponse::new(entries, total, page)))
}
