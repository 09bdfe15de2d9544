//! HTTP middleware for request processing and protection.
//!
//! Global layers (panic recovery, CORS, security headers, tracing, client IP,
//! audit) wrap every route; rate limiting, the login guard and authentication
//! are attached per route group in [`crate::routes`].

pub mod audit;
pub mod auth;
pub mod client_ip;
pub mod cors;
pub mod login_guard;
pub mod rate_limit;
pub mod recovery;
pub mod rejection;
pub mod security_headers;
pub mod tracing;

pub use audit::AuditRecorder;
pub use client_ip::{ClientIp, ClientIpConfig};
pub use rejection::Rejection;
