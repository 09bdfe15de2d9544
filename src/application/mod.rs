//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::auth_service::AuthService`] - Password login and bearer tokens
//! - [`services::user_service::UserService`] - User accounts
//! - [`services::resource_request_service::ResourceRequestService`] - Approval workflow
//! - [`services::audit_service::AuditService`] - Audit trail queries
//! - [`services::request_limiter::RequestLimiter`] - Fixed-window request admission
//! - [`services::login_limiter::LoginAttemptLimiter`] - Failed-login lockout

pub mod services;
