//! Argon2id password hashing for the email/password credential flow.
//!
//! Hashes are stored in PHC string format, so parameters and salt travel
//! with the hash. Phone-only accounts have no hash and never verify.

use std::sync::LazyLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use streamshort_core::validation::MIN_PASSWORD_LENGTH;

use crate::error::{AppError, AppResult};

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

/// Checked instead of a real hash when none exists, so every failed login
/// pays for one Argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("streamshort-placeholder-password").ok());

/// Check `password` against a stored PHC hash.
///
/// `None` (no such account, or an account without a password) and
/// mismatches both yield `Ok(false)`; only a corrupt stored hash is an error.
pub fn verify_password(password: &str, stored: Option<&str>) -> AppResult<bool> {
    let Some(stored) = stored else {
        verify_against_placeholder(password);
        return Ok(false);
    };
    let parsed = PasswordHash::new(stored)
        .map_err(|e| AppError::InternalError(format!("Stored password hash is invalid: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::InternalError(format!(
            "Password verification error: {e}"
        ))),
    }
}

fn verify_against_placeholder(password: &str) {
    let Some(Ok(parsed)) = DUMMY_HASH.as_deref().map(PasswordHash::new) else {
        return;
    };
    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
    {
        tracing::warn!("Password matched the placeholder hash");
    }
}

/// Enforce the minimum password length.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ));
    }
    Ok(())
}
