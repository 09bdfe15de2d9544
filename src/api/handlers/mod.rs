//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod audit_logs;
pub mod auth;
pub mod health;
pub mod resource_requests;
pub mod users;

pub use audit_logs::audit_logs_handler;
pub use auth::{login_handler, logout_handler, me_handler};
pub use health::{health_handler, ready_handler};
pub use resource_requests::{
    approve_request_handler, cancel_request_handler, create_request_handler, get_request_handler,
    list_requests_handler, reject_request_handler,
};
pub use users::{create_user_handler, get_user_handler, list_users_handler, update_user_handler};
