//! Handlers for user administration.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::pagination::{PagedResponse, PaginationParams};
use crate::api::dto::user::{CreateUserRequest, UpdateUserRequest, UserItem};
use crate::domain::entities::Role;
use crate::domain::identity::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Lists users, oldest first.
///
/// # Endpoint
///
/// `GET /api/v1/users?page=1&page_size=25` (admin)
pub async fn list_users_handler(
    State(state): State<AppState>,
    caller: CurrentUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PagedResponse<UserItem>>, AppError> {
    caller.require_admin()?;
    let page = params.validate()?;

    let (users, total) = state
        .user_service
        .list_users(page.offset(), page.limit())
        .await?;

    Ok(Json(PagedResponse::new(users, total, page)))
}

/// Creates a user account.
///
/// # Endpoint
///
/// `POST /api/v1/users` (admin)
///
/// Role defaults to `member`. Answers 409 when the username is taken.
pub async fn create_user_handler(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserItem>), AppError> {
    caller.require_admin()?;
    payload.validate()?;

    let user = state
        .user_service
        .create_user(
            payload.username,
            payload.display_name,
            &payload.password,
            payload.role.unwrap_or(Role::Member),
        )
        .await?;

    tracing::info!(
        user_id = user.id,
        created_by = caller.user_id,
        "User created"
    );

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `GET /api/v1/users/{id}` (admin or the user themself)
pub async fn get_user_handler(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<UserItem>, AppError> {
    caller.require_self_or_admin(id)?;
    let user = state.user_service.get_user(id).await?;
    Ok(Json(user.into()))
}

/// Partially updates a user.
///
/// # Endpoint
///
/// `PATCH /api/v1/users/{id}` (admin)
///
/// Deactivating a user revokes every token they hold.
pub async fn update_user_handler(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserItem>, AppError> {
    caller.require_admin()?;
    payload.validate()?;

    let user = state.user_service.update_user(id, payload.into()).await?;

    if !user.is_active {
        let revoked = state.auth_service.revoke_all_for_user(user.id).await?;
        tracing::info!(user_id = user.id, revoked, "Tokens revoked for deactivated user");
    }

    Ok(Json(user.into()))
}
