//! PostgreSQL implementation of audit repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{AuditLogEntry, AuditOutcome};
use crate::domain::repositories::{AuditFilter, AuditRepository};
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    user_id: String,
    username: String,
    action: String,
    resource: String,
    client_ip: String,
    user_agent: String,
    status: String,
    status_code: i32,
    request_body: String,
    duration_ms: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditLogEntry {
    type Error = AppError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<AuditOutcome>().map_err(|e| {
            tracing::error!(id = %row.id, "Corrupt audit row: {}", e);
            AppError::internal("Internal server error", json!({}))
        })?;

        Ok(AuditLogEntry {
            id: row.id,
            user_id: row.user_id,
            username: row.username,
            action: row.action,
            resource: row.resource,
            client_ip: row.client_ip,
            user_agent: row.user_agent,
            status,
            status_code: u16::try_from(row.status_code).unwrap_or_default(),
            request_body: row.request_body,
            duration_ms: row.duration_ms,
            created_at: row.created_at,
        })
    }
}

/// PostgreSQL repository for the audit trail.
///
/// Filters use nullable parameters (`$n IS NULL OR ...`) so one statement
/// serves every filter combination.
pub struct PgAuditRepository {
    pool: Arc<PgPool>,
}

impl PgAuditRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PgAuditRepository {
    async fn create(&self, entry: &AuditLogEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                id, user_id, username, action, resource, client_ip, user_agent,
                status, status_code, request_body, duration_ms, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.user_id)
        .bind(&entry.username)
        .bind(&entry.action)
        .bind(&entry.resource)
        .bind(&entry.client_ip)
        .bind(&entry.user_agent)
        .bind(entry.status.as_str())
        .bind(i32::from(entry.status_code))
        .bind(&entry.request_body)
        .bind(entry.duration_ms)
        .bind(entry.created_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn list(&self, filter: AuditFilter) -> Result<Vec<AuditLogEntry>, AppError> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, user_id, username, action, resource, client_ip, user_agent,
                   status, status_code, request_body, duration_ms, created_at
            FROM audit_logs
            WHERE ($1::text IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::timestamptz IS NULL OR created_at >= $3)
              AND ($4::timestamptz IS NULL OR created_at <= $4)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(AuditLogEntry::try_from).collect()
    }

    async fn count(&self, filter: AuditFilter) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM audit_logs
            WHERE ($1::text IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::timestamptz IS NULL OR created_at >= $3)
              AND ($4::timestamptz IS NULL OR created_at <= $4)
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.from)
        .bind(filter.to)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }
}
