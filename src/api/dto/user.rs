//! DTOs for user management endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::domain::entities::{Role, User, UserPatch};

/// Lowercase letters, digits, `_`, `.` and `-`, 3 to 32 characters.
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_.-]{3,32}$").unwrap());

/// Public view of a user. Never includes the password hash.
#[derive(Debug, Serialize)]
pub struct UserItem {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserItem {
    fn from(u: User) -> Self {
        UserItem {
            id: u.id,
            username: u.username,
            display_name: u.display_name,
            role: u.role,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}

/// Request body for `POST /api/v1/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(regex(
        path = "*USERNAME_REGEX",
        message = "Username must be 3-32 characters of a-z, 0-9, '_', '.', '-'"
    ))]
    pub username: String,

    #[validate(length(max = 100))]
    pub display_name: Option<String>,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    /// Defaults to `member`.
    pub role: Option<Role>,
}

/// Request body for `PATCH /api/v1/users/{id}`. Absent fields are unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,

    pub role: Option<Role>,

    pub is_active: Option<bool>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(r: UpdateUserRequest) -> Self {
        UserPatch {
            display_name: r.display_name,
            role: r.role,
            is_active: r.is_active,
        }
    }
}
