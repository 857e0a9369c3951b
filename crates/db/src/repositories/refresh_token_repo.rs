//! Repository for the `refresh_tokens` table.

use sqlx::PgPool;
use streamshort_core::types::{DbId, Timestamp};

use crate::models::refresh_token::{CreateRefreshToken, RefreshToken};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_hash, expires_at, is_revoked, created_at";

/// Provides persistence for refresh tokens.
pub struct RefreshTokenRepo;

impl RefreshTokenRepo {
    /// Insert a new token, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateRefreshToken,
    ) -> Result<RefreshToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshToken>(&query)
            .bind(input.user_id)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find an active token by its digest.
    ///
    /// Only returns tokens that are not revoked and not expired at `now`.
    pub async fn find_active_by_hash(
        pool: &PgPool,
        hash: &str,
        now: Timestamp,
    ) -> Result<Option<RefreshToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM refresh_tokens
             WHERE token_hash = $1
               AND is_revoked = false
               AND expires_at > $2"
        );
        sqlx::query_as::<_, RefreshToken>(&query)
            .bind(hash)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Revoke `old_hash` and insert `replacement` in one transaction.
    ///
    /// The revoke is conditional on the old token still being active; if it
    /// is not, the transaction is rolled back and `None` is returned.
    pub async fn rotate(
        pool: &PgPool,
        old_hash: &str,
        replacement: &CreateRefreshToken,
        now: Timestamp,
    ) -> Result<Option<RefreshToken>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let revoked = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = true
             WHERE token_hash = $1 AND is_revoked = false AND expires_at > $2",
        )
        .bind(old_hash)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if revoked.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, RefreshToken>(&query)
            .bind(replacement.user_id)
            .bind(&replacement.token_hash)
            .bind(replacement.expires_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(created))
    }

    /// Revoke all active tokens for a user. Returns the count of revoked tokens.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = true
             WHERE user_id = $1 AND is_revoked = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
