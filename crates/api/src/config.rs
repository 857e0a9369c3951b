use std::str::FromStr;

use axum::http::HeaderValue;
use chrono::TimeDelta;
use streamshort_core::otp::DEFAULT_OTP_TTL_SECS;

use crate::auth::jwt::JwtConfig;

/// Startup configuration failures. The process exits before binding a socket.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("JWT_SECRET must be at least {min} bytes long")]
    WeakSecret { min: usize },
}

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration loaded from environment variables.
///
/// Everything except `JWT_SECRET` has a default suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Lifetime of an OTP challenge (default: 300 seconds).
    pub otp_ttl: TimeDelta,
    pub log_format: LogFormat,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8080`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `OTP_EXPIRY_SECS`      | `300`                      |
    /// | `LOG_FORMAT`           | `text` (`json` supported)  |
    ///
    /// JWT settings are documented on [`JwtConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] but reads values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or("PORT", &lookup, 8080u16, "a valid u16")?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if let Some(bad) = cors_origins
            .iter()
            .find(|o| o.parse::<HeaderValue>().is_err())
        {
            return Err(ConfigError::Invalid {
                name: "CORS_ORIGINS",
                expected: "a comma-separated list of origins",
                value: bad.clone(),
            });
        }

        let request_timeout_secs =
            parse_or("REQUEST_TIMEOUT_SECS", &lookup, 30u64, "a valid u64")?;

        let otp_ttl = parse_ttl(
            "OTP_EXPIRY_SECS",
            &lookup,
            DEFAULT_OTP_TTL_SECS,
            MAX_OTP_EXPIRY_SECS,
            TimeDelta::try_seconds,
            "an integer between 1 and 86400",
        )?;

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::to_lowercase) {
            None => LogFormat::Text,
            Some(f) if f == "text" => LogFormat::Text,
            Some(f) if f == "json" => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    expected: "`text` or `json`",
                    value: other,
                })
            }
        };

        let jwt = JwtConfig::from_lookup(&lookup)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            otp_ttl,
            log_format,
            jwt,
        })
    }
}

/// Upper bound for `OTP_EXPIRY_SECS` (one day).
const MAX_OTP_EXPIRY_SECS: i64 = 86_400;

/// Parse a lifetime given in whole units and convert it with `unit`.
///
/// Values outside `1..=max` are rejected so that adding the lifetime to a
/// timestamp can never overflow.
pub(crate) fn parse_ttl(
    name: &'static str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: i64,
    max: i64,
    unit: fn(i64) -> Option<TimeDelta>,
    expected: &'static str,
) -> Result<TimeDelta, ConfigError> {
    let value: i64 = parse_or(name, lookup, default, expected)?;
    (1..=max)
        .contains(&value)
        .then(|| unit(value))
        .flatten()
        .ok_or_else(|| ConfigError::Invalid {
            name,
            expected,
            value: value.to_string(),
        })
}

/// Parse `name` if present, otherwise fall back to `default`.
pub(crate) fn parse_or<T: FromStr>(
    name: &'static str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_with_only_secret() {
        let config = load(&[("JWT_SECRET", SECRET)]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.otp_ttl, TimeDelta::seconds(300));
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.jwt.access_ttl, TimeDelta::seconds(3600));
        assert_eq!(config.jwt.refresh_ttl, TimeDelta::days(7));
    }

    #[test]
    fn missing_secret_fails_closed() {
        assert_matches!(load(&[]), Err(ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn short_secret_rejected() {
        assert_matches!(
            load(&[("JWT_SECRET", "too-short")]),
            Err(ConfigError::WeakSecret { .. })
        );
    }

    #[test]
    fn bad_port_rejected() {
        assert_matches!(
            load(&[("JWT_SECRET", SECRET), ("PORT", "http")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        );
    }

    #[test]
    fn cors_origins_split_and_trimmed() {
        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("CORS_ORIGINS", "https://a.example, https://b.example,"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();
        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn non_positive_otp_expiry_rejected() {
        assert_matches!(
            load(&[("JWT_SECRET", SECRET), ("OTP_EXPIRY_SECS", "0")]),
            Err(ConfigError::Invalid { name: "OTP_EXPIRY_SECS", .. })
        );
    }

    #[test]
    fn huge_otp_expiry_rejected_at_load() {
        assert_matches!(
            load(&[("JWT_SECRET", SECRET), ("OTP_EXPIRY_SECS", "9999999999999999")]),
            Err(ConfigError::Invalid { name: "OTP_EXPIRY_SECS", .. })
        );
    }

    #[test]
    fn non_positive_token_lifetimes_rejected() {
        assert_matches!(
            load(&[("JWT_SECRET", SECRET), ("JWT_ACCESS_EXPIRY_SECS", "0")]),
            Err(ConfigError::Invalid { name: "JWT_ACCESS_EXPIRY_SECS", .. })
        );
        assert_matches!(
            load(&[("JWT_SECRET", SECRET), ("JWT_REFRESH_EXPIRY_DAYS", "-1")]),
            Err(ConfigError::Invalid { name: "JWT_REFRESH_EXPIRY_DAYS", .. })
        );
    }

    #[test]
    fn out_of_range_token_lifetimes_rejected() {
        assert_matches!(
            load(&[("JWT_SECRET", SECRET), ("JWT_ACCESS_EXPIRY_SECS", "9223372036854775807")]),
            Err(ConfigError::Invalid { name: "JWT_ACCESS_EXPIRY_SECS", .. })
        );
        assert_matches!(
            load(&[("JWT_SECRET", SECRET), ("JWT_REFRESH_EXPIRY_DAYS", "100000000000")]),
            Err(ConfigError::Invalid { name: "JWT_REFRESH_EXPIRY_DAYS", .. })
        );
    }

    #[test]
    fn custom_lifetimes_loaded() {
        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("OTP_EXPIRY_SECS", "120"),
            ("JWT_ACCESS_EXPIRY_SECS", "900"),
            ("JWT_REFRESH_EXPIRY_DAYS", "30"),
        ])
        .unwrap();
        assert_eq!(config.otp_ttl, TimeDelta::seconds(120));
        assert_eq!(config.jwt.access_ttl, TimeDelta::seconds(900));
        assert_eq!(config.jwt.refresh_ttl, TimeDelta::days(30));
    }
}
