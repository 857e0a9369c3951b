//! Small input validators shared by the credential and content flows.
//!
//! Each returns `Err` with a human-readable message suitable for a 400 body.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex")
});

/// Minimum accepted password length for the email/password flow.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Require a non-blank string field.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}

/// Trim and lower-case an email address, rejecting malformed input.
pub fn normalize_email(raw: &str) -> Result<String, String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if !EMAIL_RE.is_match(&email) {
        return Err("Email is malformed".to_string());
    }
    Ok(email)
}

/// Require a strictly positive integer field.
pub fn require_positive(field: &str, value: i32) -> Result<(), String> {
    if value <= 0 {
        return Err(format!("{field} must be greater than 0"));
    }
    Ok(())
}
