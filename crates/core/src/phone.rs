//! Phone number normalization and masking.

use std::sync::LazyLock;

use regex::Regex;

/// Optional leading `+`, then 7 to 15 digits with a non-zero first digit.
const PHONE_PATTERN: &str = r"^\+?[1-9][0-9]{6,14}$";

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("valid regex"));

/// Trim and validate a phone number, returning the canonical form.
pub fn normalize_phone(raw: &str) -> Result<String, String> {
    let phone = raw.trim();
    if phone.is_empty() {
        return Err("Phone number is required".to_string());
    }
    if !PHONE_RE.is_match(phone) {
        return Err("Phone number is malformed".to_string());
    }
    Ok(phone.to_string())
}

/// Mask all but the last four digits, for logs.
pub fn mask_phone(phone: &str) -> String {
    let visible = phone.len().saturating_sub(4);
    phone
        .char_indices()
        .map(|(i, c)| if i < visible && c.is_ascii_digit() { '*' } else { c })
        .collect()
}
