//! JWT access-token signing and verification.
//!
//! Access tokens are HS256-signed JWTs containing a [`Claims`] payload. The
//! algorithm is pinned on verification, so tokens whose header names any
//! other algorithm (including `none`) are rejected before the signature is
//! looked at. Time claims are checked against the caller-supplied clock
//! rather than the library's own system-time check.

use std::fmt;

use chrono::TimeDelta;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use streamshort_core::error::AuthError;
use streamshort_core::types::DbId;

use crate::config::{parse_ttl, ConfigError};

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject -- the user's id.
    pub sub: DbId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// The user's role name (e.g. `"user"`, `"creator"`).
    pub role: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Not-before time (UTC Unix timestamp).
    pub nbf: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Unique token identifier (UUID v4) for audit.
    pub jti: String,
}

/// Configuration for JWT token generation and validation.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime (default: one hour).
    pub access_ttl: TimeDelta,
    /// Refresh token lifetime (default: seven days).
    pub refresh_ttl: TimeDelta,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Minimum secret length in bytes (256 bits, matching the HMAC output size).
pub const MIN_SECRET_BYTES: usize = 32;
/// Default access token expiry in seconds.
const DEFAULT_ACCESS_EXPIRY_SECS: i64 = 3600;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;
/// Upper bound for `JWT_ACCESS_EXPIRY_SECS` (one day).
const MAX_ACCESS_EXPIRY_SECS: i64 = 86_400;
/// Upper bound for `JWT_REFRESH_EXPIRY_DAYS`.
const MAX_REFRESH_EXPIRY_DAYS: i64 = 365;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_SECS`   | no       | `3600`  |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `7`     |
    ///
    /// There is no compiled-in fallback secret: a missing or short secret is
    /// an error.
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::WeakSecret {
                min: MIN_SECRET_BYTES,
            });
        }

        let access_ttl = parse_ttl(
            "JWT_ACCESS_EXPIRY_SECS",
            lookup,
            DEFAULT_ACCESS_EXPIRY_SECS,
            MAX_ACCESS_EXPIRY_SECS,
            TimeDelta::try_seconds,
            "an integer between 1 and 86400",
        )?;
        let refresh_ttl = parse_ttl(
            "JWT_REFRESH_EXPIRY_DAYS",
            lookup,
            DEFAULT_REFRESH_EXPIRY_DAYS,
            MAX_REFRESH_EXPIRY_DAYS,
            TimeDelta::try_days,
            "an integer between 1 and 365",
        )?;

        Ok(Self {
            secret,
            access_ttl,
            refresh_ttl,
        })
    }
}

/// Signing material derived once from [`JwtConfig::secret`].
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp/nbf are compared against the injected clock in `validate_token`.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

/// Sign `claims` as an HS256 JWT.
pub fn generate_access_token(
    claims: &Claims,
    keys: &JwtKeys,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(&Header::new(Algorithm::HS256), claims, &keys.encoding)
}

/// Verify and decode an access token at time `now` (Unix seconds).
///
/// Any failure (bad signature, wrong algorithm, malformed payload, `now >= exp`,
/// `now < nbf`) is reported as [`AuthError::InvalidToken`].
pub fn validate_token(token: &str, keys: &JwtKeys, now: i64) -> Result<Claims, AuthError> {
    let data = decode::<Claims>(token, &keys.decoding, &keys.validation).map_err(|e| {
        tracing::debug!(error = %e, "Access token rejected");
        AuthError::InvalidToken
    })?;
    let claims = data.claims;

    if now >= claims.exp || now < claims.nbf {
        tracing::debug!(sub = %claims.sub, "Access token outside its validity window");
        return Err(AuthError::InvalidToken);
    }
    Ok(claims)
}
