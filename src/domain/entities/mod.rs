//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`User`] - A platform account with a [`Role`]
//! - [`ResourceRequest`] - A resource request moving through approval
//! - [`AuditLogEntry`] - An immutable record of one audited request
//!
//! Creation inputs live next to their entity (`NewUser`, `NewResourceRequest`),
//! as do partial updates (`UserPatch`, `StatusTransition`).

pub mod audit_log;
pub mod resource_request;
pub mod user;

pub use audit_log::{AuditContext, AuditLogEntry, AuditOutcome};
pub use resource_request::{NewResourceRequest, RequestStatus, ResourceRequest, StatusTransition};
pub use user::{NewUser, Role, User, UserPatch};
