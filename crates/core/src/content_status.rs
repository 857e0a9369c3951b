//! Status allow-lists for series and episodes, plus pricing/KYC constants.

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

pub const SERIES_DRAFT: &str = "draft";
pub const SERIES_PUBLISHED: &str = "published";

/// Valid target states for a series status change.
pub const SERIES_STATUSES: &[&str] = &[SERIES_DRAFT, SERIES_PUBLISHED];

// ---------------------------------------------------------------------------
// Episodes
// ---------------------------------------------------------------------------

pub const EPISODE_PENDING_UPLOAD: &str = "pending_upload";
pub const EPISODE_QUEUED_TRANSCODE: &str = "queued_transcode";
pub const EPISODE_READY: &str = "ready";
pub const EPISODE_PUBLISHED: &str = "published";

/// Valid target states for an episode status change.
pub const EPISODE_STATUSES: &[&str] = &[
    EPISODE_PENDING_UPLOAD,
    EPISODE_QUEUED_TRANSCODE,
    EPISODE_READY,
    EPISODE_PUBLISHED,
];

// ---------------------------------------------------------------------------
// Pricing and KYC
// ---------------------------------------------------------------------------

pub const PRICE_FREE: &str = "free";
pub const PRICE_TYPES: &[&str] = &[PRICE_FREE, "subscription", "one_time"];

/// KYC state of a freshly onboarded or re-submitted profile. Reviews that
/// move it to `verified` or `rejected` happen outside this service.
pub const KYC_PENDING: &str = "pending";

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Lower-case and trim a requested status, mapping the `publish` alias.
fn canonical(raw: &str) -> String {
    let s = raw.trim().to_lowercase();
    if s == "publish" {
        SERIES_PUBLISHED.to_string()
    } else {
        s
    }
}

fn normalize_against(raw: &str, allowed: &[&'static str]) -> Result<&'static str, String> {
    let wanted = canonical(raw);
    allowed
        .iter()
        .copied()
        .find(|s| *s == wanted)
        .ok_or_else(|| format!("Invalid status. Must be one of: {}", allowed.join(", ")))
}

/// Validate and normalize a requested series status.
pub fn normalize_series_status(raw: &str) -> Result<&'static str, String> {
    normalize_against(raw, SERIES_STATUSES)
}

/// Validate and normalize a requested episode status.
pub fn normalize_episode_status(raw: &str) -> Result<&'static str, String> {
    normalize_against(raw, EPISODE_STATUSES)
}

/// Validate a price type; `None` or empty means `free`.
pub fn normalize_price_type(raw: Option<&str>) -> Result<&'static str, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(PRICE_FREE),
        Some(s) => PRICE_TYPES
            .iter()
            .copied()
            .find(|p| *p == s.to_lowercase())
            .ok_or_else(|| format!("Invalid price_type. Must be one of: {}", PRICE_TYPES.join(", "))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_status_is_case_insensitive() {
        assert_eq!(normalize_series_status("DRAFT"), Ok(SERIES_DRAFT));
        assert_eq!(normalize_series_status(" Published "), Ok(SERIES_PUBLISHED));
    }

    #[test]
    fn publish_alias_maps_to_published() {
        assert_eq!(normalize_series_status("publish"), Ok(SERIES_PUBLISHED));
        assert_eq!(normalize_episode_status("Publish"), Ok(EPISODE_PUBLISHED));
    }

    #[test]
    fn series_rejects_episode_only_states() {
        assert!(normalize_series_status("ready").is_err());
        assert!(normalize_series_status("archived").is_err());
    }

    #[test]
    fn episode_accepts_all_pipeline_states() {
        for s in EPISODE_STATUSES {
            assert_eq!(normalize_episode_status(s), Ok(*s));
        }
        assert!(normalize_episode_status("draft").is_err());
    }

    #[test]
    fn price_type_defaults_to_free() {
        assert_eq!(normalize_price_type(None), Ok(PRICE_FREE));
        assert_eq!(normalize_price_type(Some("")), Ok(PRICE_FREE));
        assert_eq!(normalize_price_type(Some("ONE_TIME")), Ok("one_time"));
        assert!(normalize_price_type(Some("rental")).is_err());
    }
}
