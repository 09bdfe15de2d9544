//! DTOs for the audit log query endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::dto::pagination::{DateFilterParams, PaginationParams};
use crate::domain::entities::{AuditLogEntry, AuditOutcome};

/// Query parameters for `GET /api/v1/audit-logs`.
#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    #[serde(flatten)]
    pub date_filter: DateFilterParams,

    pub user_id: Option<String>,

    pub status: Option<AuditOutcome>,
}

#[derive(Debug, Serialize)]
pub struct AuditLogItem {
    pub id: Uuid,
    pub user_id: String,
    pub username: String,
    pub action: String,
    pub resource: String,
    pub client_ip: String,
    pub user_agent: String,
    pub status: AuditOutcome,
    pub status_code: u16,
    pub request_body: String,
    pub duration_ms: i64,
    pub created_at: DateTime<Utc>,
}

impl From<AuditLogEntry> for AuditLogItem {
    fn from(e: AuditLogEntry) -> Self {
        AuditLogItem {
            id: e.id,
            user_id: e.user_id,
            username: e.username,
            action: e.action,
            resource: e.resource,
            client_ip: e.client_ip,
            user_agent: e.user_agent,
            status: e.status,
            status_code: e.status_code,
            request_body: e.request_body,
            duration_ms: e.duration_ms,
            created_at: e.created_at,
        }
    }
}
