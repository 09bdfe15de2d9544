//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and counter storage.
//!
//! # Modules
//!
//! - [`counter`] - Atomic counter stores (Redis and in-process implementations)
//! - [`persistence`] - PostgreSQL repository implementations

pub mod counter;
pub mod persistence;
