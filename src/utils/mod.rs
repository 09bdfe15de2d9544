//! Shared helpers without a home in a specific layer.

pub mod client_ip;
pub mod password;
pub mod redact;
