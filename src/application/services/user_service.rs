//! User account management service.

use std::sync::Arc;

use crate::domain::entities::{NewUser, Role, User, UserPatch};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::utils::password::hash_password;
use serde_json::json;

/// Service for creating, listing and updating user accounts.
///
/// Authorization is checked by handlers; this layer owns hashing and the
/// not-found/conflict mapping.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Creates a user with an Argon2id-hashed password.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the username is taken.
    pub async fn create_user(
        &self,
        username: String,
        display_name: Option<String>,
        password: &str,
        role: Role,
    ) -> Result<User, AppError> {
        let password_hash = hash_password(password)?;
        let display_name = display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| username.clone());

        let user = self
            .repository
            .create(NewUser {
                username,
                display_name,
                password_hash,
                role,
            })
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no user has this id.
    pub async fn get_user(&self, id: i64) -> Result<User, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| user_not_found(id))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User, AppError> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::not_found("User not found", json!({ "username": username }))
            })
    }

    /// Returns one page of users plus the total count.
    pub async fn list_users(&self, offset: i64, limit: i64) -> Result<(Vec<User>, i64), AppError> {
        let users = self.repository.list(offset, limit).await?;
        let total = self.repository.count().await?;
        Ok((users, total))
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the patch changes nothing.
    ///
    /// Returns [`AppError::NotFound`] if no user has this id.
    pub async fn update_user(&self, id: i64, patch: UserPatch) -> Result<User, AppError> {
        if patch.is_empty() {
            return Err(AppError::bad_request(
                "Nothing to update",
                json!({ "fields": ["display_name", "role", "is_active"] }),
            ));
        }

        let user = self
            .repository
            .update(id, patch)
            .await?
            .ok_or_else(|| user_not_found(id))?;

        tracing::info!(user_id = user.id, role = %user.role, is_active = user.is_active, "User updated");
        Ok(user)
    }
}

fn user_not_found(id: i64) -> AppError {
    AppError::not_found("User not found", json!({ "id": id }))
}
