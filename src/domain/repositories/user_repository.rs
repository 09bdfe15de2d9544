//! Repository trait for user accounts.

use crate::domain::entities::{NewUser, User, UserPatch};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for user accounts.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the username is taken.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Lists users ordered by id.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    /// Applies a partial update; `Ok(None)` if the user does not exist.
    async fn update(&self, id: i64, patch: UserPatch) -> Result<Option<User>, AppError>;
}
