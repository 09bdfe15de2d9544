//! Business logic services for the application layer.

pub mod audit_service;
pub mod auth_service;
pub mod login_limiter;
pub mod request_limiter;
pub mod resource_request_service;
pub mod user_service;

pub use audit_service::AuditService;
pub use auth_service::{AuthService, IssuedToken};
pub use login_limiter::{LockState, LoginAttemptLimiter};
pub use request_limiter::{Admission, RequestLimiter};
pub use resource_request_service::ResourceRequestService;
pub use user_service::UserService;
