//! PostgreSQL implementation of resource request repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{
    NewResourceRequest, RequestStatus, ResourceRequest, StatusTransition,
};
use crate::domain::repositories::{ResourceRequestFilter, ResourceRequestRepository};
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: i64,
    requester_id: i64,
    resource_type: String,
    quantity: i32,
    justification: String,
    status: String,
    reviewer_id: Option<i64>,
    review_comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RequestRow> for ResourceRequest {
    type Error = AppError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<RequestStatus>().map_err(|e| {
            tracing::error!(request_id = row.id, "Corrupt resource request row: {}", e);
            AppError::internal("Internal server error", json!({}))
        })?;

        Ok(ResourceRequest {
            id: row.id,
            requester_id: row.requester_id,
            resource_type: row.resource_type,
            quantity: row.quantity,
            justification: row.justification,
            status,
            reviewer_id: row.reviewer_id,
            review_comment: row.review_comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const REQUEST_COLUMNS: &str = "id, requester_id, resource_type, quantity, justification, \
     status, reviewer_id, review_comment, created_at, updated_at";

/// PostgreSQL repository for resource requests.
pub struct PgResourceRequestRepository {
    pool: Arc<PgPool>,
}

impl PgResourceRequestRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceRequestRepository for PgResourceRequestRepository {
    async fn create(&self, request: NewResourceRequest) -> Result<ResourceRequest, AppError> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            r#"
            INSERT INTO resource_requests (requester_id, resource_type, quantity, justification)
            VALUES ($1, $2, $3, $4)
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(request.requester_id)
        .bind(&request.resource_type)
        .bind(request.quantity)
        .bind(&request.justification)
        .fetch_one(self.pool.as_ref())
        .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ResourceRequest>, AppError> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM resource_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ResourceRequest::try_from).transpose()
    }

    async fn list(&self, filter: ResourceRequestFilter) -> Result<Vec<ResourceRequest>, AppError> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM resource_requests
            WHERE ($1::bigint IS NULL OR requester_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(filter.requester_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(ResourceRequest::try_from).collect()
    }

    async fn count(&self, filter: ResourceRequestFilter) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM resource_requests
            WHERE ($1::bigint IS NULL OR requester_id = $1)
              AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(filter.requester_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn transition(
        &self,
        id: i64,
        transition: StatusTransition,
    ) -> Result<Option<ResourceRequest>, AppError> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            r#"
            UPDATE resource_requests
            SET status = $3,
                reviewer_id = COALESCE($4, reviewer_id),
                review_comment = COALESCE($5, review_comment),
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(transition.from.as_str())
        .bind(transition.to.as_str())
        .bind(transition.reviewer_id)
        .bind(transition.comment)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ResourceRequest::try_from).transpose()
    }
}
