//! Refresh token model and DTOs.

use sqlx::FromRow;
use streamshort_core::types::{DbId, Timestamp};

/// A row from the `refresh_tokens` table. Only the SHA-256 digest of the
/// token handed to the client is stored.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub created_at: Timestamp,
}

impl RefreshToken {
    pub fn is_active(&self, now: Timestamp) -> bool {
        !self.is_revoked && now < self.expires_at
    }
}

/// DTO for persisting a freshly issued refresh token.
#[derive(Debug, Clone)]
pub struct CreateRefreshToken {
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
}
