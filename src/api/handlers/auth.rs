//! Handlers for login, logout and the current identity.

use axum::{Json, extract::State, http::StatusCode};
use axum_auth::AuthBearer;
use validator::Validate;

use crate::api::dto::auth::{LoginRequest, LoginResponse};
use crate::api::dto::user::UserItem;
use crate::api::middleware::ClientIp;
use crate::domain::identity::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Exchanges a username and password for a bearer token.
///
/// # Endpoint
///
/// `POST /api/v1/auth/login`
///
/// # Lockout
///
/// The login guard in front of this handler rejects locked clients before
/// they get here. A rejected credential counts one failure against the
/// client IP; a successful login clears the count.
///
/// # Errors
///
/// - 400 on malformed input
/// - 401 for unknown users, wrong passwords and deactivated accounts
pub async fn login_handler(
    State(state): State<AppState>,
    client_ip: ClientIp,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    payload.validate()?;

    let client_key = client_ip.key();

    match state
        .auth_service
        .login(&payload.username, &payload.password)
        .await
    {
        Ok(issued) => {
            state.login_limiter.clear_on_success(&client_key).await;

            Ok(Json(LoginResponse {
                token: issued.token,
                token_type: "Bearer",
                expires_at: issued.expires_at,
                user: UserItem::from(issued.user),
            }))
        }
        Err(err @ AppError::Unauthorized { .. }) => {
            let failures = state.login_limiter.record_failure(&client_key).await;
            tracing::warn!(
                client_ip = %client_key,
                username = %payload.username,
                failures = ?failures,
                "Login failed"
            );
            Err(err)
        }
        Err(err) => Err(err),
    }
}

/// Revokes the bearer token used for this request.
///
/// # Endpoint
///
/// `POST /api/v1/auth/logout`
pub async fn logout_handler(
    State(state): State<AppState>,
    AuthBearer(token): AuthBearer,
) -> Result<StatusCode, AppError> {
    state.auth_service.logout(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/v1/auth/me`
pub async fn me_handler(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<UserItem>, AppError> {
    let user = state.user_service.get_user(user.user_id).await?;
    Ok(Json(user.into()))
}
