//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. Queries
//! are bound at runtime and decoded through `FromRow` row structs.
//!
//! # Repositories
//!
//! - [`PgUserRepository`] - User accounts
//! - [`PgTokenRepository`] - Bearer token storage and validation
//! - [`PgAuditRepository`] - Audit trail persistence and queries
//! - [`PgResourceRequestRepository`] - Resource requests and approvals

pub mod pg_audit_repository;
pub mod pg_resource_request_repository;
pub mod pg_token_repository;
pub mod pg_user_repository;

pub use pg_audit_repository::PgAuditRepository;
pub use pg_resource_request_repository::PgResourceRequestRepository;
pub use pg_token_repository::PgTokenRepository;
pub use pg_user_repository::PgUserRepository;
