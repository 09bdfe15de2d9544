//! Authenticated identity carried through a request.

use serde::Serialize;
use serde_json::json;

use crate::domain::entities::Role;
use crate::error::AppError;

/// The caller resolved by the authentication middleware.
///
/// Travels in request extensions as an explicit value; a request without one
/// is unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with 403 unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "Admin role required",
                json!({ "role": self.role }),
            ))
        }
    }

    /// Fails with 403 unless the caller is `owner_id` or an admin.
    pub fn require_self_or_admin(&self, owner_id: i64) -> Result<(), AppError> {
        if self.is_admin() || self.user_id == owner_id {
            Ok(())
        } else {
            Err(AppError::forbidden("Access denied", json!({})))
        }
    }
}
