//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; PostgreSQL implementations
//! live in `crate::infrastructure::persistence`. Mock implementations are
//! generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`UserRepository`] - User accounts
//! - [`TokenRepository`] - Bearer token authentication
//! - [`AuditRepository`] - Audit trail persistence and queries
//! - [`ResourceRequestRepository`] - Resource requests and approvals
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod audit_repository;
pub mod resource_request_repository;
pub mod token_repository;
pub mod user_repository;

pub use audit_repository::{AuditFilter, AuditRepository};
pub use resource_request_repository::{ResourceRequestFilter, ResourceRequestRepository};
pub use token_repository::{ApiToken, TokenRepository};
pub use user_repository::UserRepository;

#[cfg(test)]
pub use audit_repository::MockAuditRepository;
#[cfg(test)]
pub use resource_request_repository::MockResourceRequestRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
