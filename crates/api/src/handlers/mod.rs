pub mod auth;
pub mod creator;
pub mod episode;
pub mod health;
pub mod series;

/// Trim an optional text field, treating blank as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
