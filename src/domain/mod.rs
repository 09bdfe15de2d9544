//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`identity`] - Authenticated caller carried through a request
//! - [`audit_worker`] - Background writer for the audit trail
//!
//! # Audit Flow
//!
//! 1. The audit middleware builds an [`entities::AuditLogEntry`] after the response
//! 2. The entry is pushed onto a bounded channel without waiting
//! 3. [`audit_worker::run_audit_worker`] persists it via [`repositories::AuditRepository`]

pub mod audit_worker;
pub mod entities;
pub mod identity;
pub mod repositories;
