//! Token service: access/refresh token issuance, rotation and revocation.
//!
//! Refresh tokens are 256-bit random strings. Only their SHA-256 digest is
//! persisted, so a database leak does not expose live sessions. Every
//! successful refresh revokes the presented token in the same store
//! operation that records its replacement.

use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use streamshort_core::clock::Clock;
use streamshort_core::error::{AuthError, CoreError};
use streamshort_core::hashing::{generate_secure_token, sha256_hex};
use streamshort_core::types::{DbId, Timestamp};
use streamshort_db::models::refresh_token::CreateRefreshToken;
use streamshort_db::models::user::User;
use streamshort_db::CredentialStore;
use uuid::Uuid;

use crate::auth::jwt::{generate_access_token, validate_token, Claims, JwtConfig, JwtKeys};
use crate::error::{AppError, AppResult};

/// Access + refresh token pair returned by verify, refresh, register and login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

pub struct TokenService {
    credentials: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    keys: JwtKeys,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(
        config: &JwtConfig,
        credentials: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            clock,
            keys: JwtKeys::new(&config.secret),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    /// Mint an access token and persist a new refresh token for `user`.
    pub async fn issue_token_pair(&self, user: &User) -> AppResult<TokenPair> {
        let now = self.clock.now();
        let access_token = self.sign_access_token(user, now)?;
        let (refresh_token, record) = self.new_refresh_token(user.id, now);
        self.credentials.create_refresh_token(&record).await?;

        tracing::debug!(user_id = %user.id, "Issued token pair");
        Ok(self.pair(access_token, refresh_token))
    }

    /// Exchange a live refresh token for a new pair, revoking the old one.
    ///
    /// The presented token must match a stored token that is neither
    /// revoked nor expired. If two callers race with the same token only
    /// one rotation commits; the other gets [`AuthError::InvalidRefreshToken`].
    pub async fn refresh_token_pair(&self, presented: &str) -> AppResult<TokenPair> {
        let presented = presented.trim();
        if presented.is_empty() {
            return Err(AuthError::InvalidRefreshToken.into());
        }
        let now = self.clock.now();
        let old_hash = sha256_hex(presented.as_bytes());

        let record = self
            .credentials
            .find_active_refresh_token(&old_hash, now)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        let user = self
            .credentials
            .find_user_by_id(record.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is deactivated".into(),
            )));
        }

        let access_token = self.sign_access_token(&user, now)?;
        let (refresh_token, replacement) = self.new_refresh_token(user.id, now);

        self.credentials
            .rotate_refresh_token(&old_hash, &replacement, now)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        tracing::info!(user_id = %user.id, "Rotated refresh token");
        Ok(self.pair(access_token, refresh_token))
    }

    /// Verify signature, algorithm and validity window of an access token.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        validate_token(token, &self.keys, self.clock.now().timestamp())
    }

    /// Revoke every active refresh token of `user_id`. Idempotent.
    pub async fn revoke(&self, user_id: DbId) -> AppResult<u64> {
        let revoked = self
            .credentials
            .revoke_refresh_tokens_for_user(user_id)
            .await?;
        tracing::info!(user_id = %user_id, revoked, "Revoked refresh tokens");
        Ok(revoked)
    }

    /// Access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    fn sign_access_token(&self, user: &User, now: Timestamp) -> AppResult<String> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: user.id,
            phone: user.phone.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            iat,
            nbf: iat,
            exp: iat + self.access_ttl.num_seconds(),
            jti: Uuid::new_v4().to_string(),
        };
        generate_access_token(&claims, &self.keys)
            .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))
    }

    /// Returns the plaintext for the client and the digest record to store.
    fn new_refresh_token(&self, user_id: DbId, now: Timestamp) -> (String, CreateRefreshToken) {
        let plaintext = generate_secure_token();
        let record = CreateRefreshToken {
            user_id,
            token_hash: sha256_hex(plaintext.as_bytes()),
            expires_at: now + self.refresh_ttl,
        };
        (plaintext, record)
    }

    fn pair(&self, access_token: String, refresh_token: String) -> TokenPair {
        TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_ttl_secs(),
        }
    }
}
