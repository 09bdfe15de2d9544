//! DTOs for resource request endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::dto::pagination::PaginationParams;
use crate::domain::entities::{RequestStatus, ResourceRequest};

/// Request body for `POST /api/v1/resource-requests`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateResourceRequest {
    #[validate(length(min = 1, max = 64))]
    pub resource_type: String,

    #[validate(range(min = 1, max = 1000))]
    pub quantity: i32,

    #[validate(length(max = 2000))]
    #[serde(default)]
    pub justification: String,
}

/// Optional reviewer note for approve/reject.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

/// Query parameters for `GET /api/v1/resource-requests`.
#[derive(Debug, Deserialize)]
pub struct ResourceRequestQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    pub status: Option<RequestStatus>,
}

#[derive(Debug, Serialize)]
pub struct ResourceRequestItem {
    pub id: i64,
    pub requester_id: i64,
    pub resource_type: String,
    pub quantity: i32,
    pub justification: String,
    pub status: RequestStatus,
    pub reviewer_id: Option<i64>,
    pub review_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ResourceRequest> for ResourceRequestItem {
    fn from(r: ResourceRequest) -> Self {
        ResourceRequestItem {
            id: r.id,
            requester_id: r.requester_id,
            resource_type: r.resource_type,
            quantity: r.quantity,
            justification: r.justification,
            status: r.status,
            reviewer_id: r.reviewer_id,
            review_comment: r.review_comment,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
