//! Repository trait for bearer token authentication.

use crate::domain::identity::CurrentUser;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Bearer token issued at login.
///
/// Only the HMAC of the raw token is stored.
#[derive(Debug, Clone)]
pub struct ApiToken {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Repository interface for bearer tokens.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_token.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Resolves a token hash to its owner.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(user))` if the token is unrevoked, unexpired and the owner is active
    /// - `Ok(None)` otherwise
    async fn find_identity(&self, token_hash: &str) -> Result<Option<CurrentUser>, AppError>;

    /// Stamps `last_used_at` after a successful authentication.
    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError>;

    /// Stores a new token hash for `user_id`.
    async fn create_token(
        &self,
        user_id: i64,
        name: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ApiToken, AppError>;

    /// Revokes one token; `Ok(false)` if it was unknown or already revoked.
    async fn revoke(&self, token_hash: &str) -> Result<bool, AppError>;

    /// Revokes every live token of a user and returns how many were revoked.
    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AppError>;
}
