//! Handlers for the resource request workflow.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::pagination::PagedResponse;
use crate::api::dto::resource_request::{
    CreateResourceRequest, ResourceRequestItem, ResourceRequestQuery, ReviewRequest,
};
use crate::domain::identity::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Files a new request on behalf of the caller.
///
/// # Endpoint
///
/// `POST /api/v1/resource-requests`
///
/// # Request Body
///
/// ```json
/// {
///   "resource_type": "gpu",
///   "quantity": 2,
///   "justification": "Training run for the Q3 model"
/// }
/// ```
pub async fn create_request_handler(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(payload): Json<CreateResourceRequest>,
) -> Result<(StatusCode, Json<ResourceRequestItem>), AppError> {
    payload.validate()?;

    let request = state
        .resource_request_service
        .create(
            &caller,
            payload.resource_type,
            payload.quantity,
            payload.justification,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(request.into())))
}

/// Lists requests, newest first.
///
/// # Endpoint
///
/// `GET /api/v1/resource-requests?status=pending&page=1&page_size=25`
///
/// Admins see every request; members see only their own.
pub async fn list_requests_handler(
    State(state): State<AppState>,
    caller: CurrentUser,
    Query(query): Query<ResourceRequestQuery>,
) -> Result<Json<PagedResponse<ResourceRequestItem>>, AppError> {
    let page = query.pagination.validate()?;

    let (requests, total) = state
        .resource_request_service
        .list(&caller, query.status, page.offset(), page.limit())
        .await?;

    Ok(Json(PagedResponse::new(requests, total, page)))
}

/// `GET /api/v1/resource-requests/{id}`
pub async fn get_request_handler(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ResourceRequestItem>, AppError> {
    let request = state.resource_request_service.get(&caller, id).await?;
    Ok(Json(request.into()))
}

/// Approves a pending request.
///
/// # Endpoint
///
/// `POST /api/v1/resource-requests/{id}/approve` (admin)
///
/// The body is optional: `{"comment": "..."}`.
///
/// # Errors
///
/// Returns 409 Conflict unless the request is `pending`.
pub async fn approve_request_handler(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<i64>,
    payload: Option<Json<ReviewRequest>>,
) -> Result<Json<ResourceRequestItem>, AppError> {
    let review = payload.map(|Json(r)| r).unwrap_or_default();
    review.validate()?;

    let request = state
        .resource_request_service
        .approve(&caller, id, review.comment)
        .await?;

    Ok(Json(request.into()))
}

/// `POST /api/v1/resource-requests/{id}/reject` (admin)
pub async fn reject_request_handler(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<i64>,
    payload: Option<Json<ReviewRequest>>,
) -> Result<Json<ResourceRequestItem>, AppError> {
    let review = payload.map(|Json(r)| r).unwrap_or_default();
    review.validate()?;

    let request = state
        .resource_request_service
        .reject(&caller, id, review.comment)
        .await?;

    Ok(Json(request.into()))
}

/// Withdraws a pending request. Only its requester may cancel it.
///
/// # Endpoint
///
/// `POST /api/v1/resource-requests/{id}/cancel`
pub async fn cancel_request_handler(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ResourceRequestItem>, AppError> {
    let request = state.resource_request_service.cancel(&caller, id).await?;
    Ok(Json(request.into()))
}
