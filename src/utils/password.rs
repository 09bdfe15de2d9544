//! Password hashing and verification using Argon2id.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde_json::json;
use std::sync::LazyLock;

use crate::error::AppError;

/// Hashes a password into an Argon2id PHC string with a random salt.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let hashing_failed = |e: argon2::password_hash::Error| {
        AppError::internal("Password hashing failed", json!({ "reason": e.to_string() }))
    };

    let salt_bytes: [u8; 16] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes).map_err(hashing_failed)?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(hashing_failed)
}

/// Verifies a password against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        tracing::error!("Stored password hash is malformed: {}", e);
        AppError::internal("Invalid stored credentials", json!({}))
    })?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::internal(
            "Password verification failed",
            json!({ "reason": e.to_string() }),
        )),
    }
}

/// Hash checked when the username is unknown, so a miss costs as much as a
/// wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("no such user").ok());

/// Runs a full Argon2 verification against [`DUMMY_HASH`] and discards the result.
pub fn verify_dummy_password(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}
