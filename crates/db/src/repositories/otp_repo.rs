//! Repository for the `otp_transactions` table.

use sqlx::PgPool;
use streamshort_core::types::Timestamp;

use crate::models::otp::{CreateOtpTransaction, OtpTransaction};

const COLUMNS: &str = "id, txn_id, phone, code, expires_at, used, used_at, created_at";

pub struct OtpRepo;

impl OtpRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateOtpTransaction,
    ) -> Result<OtpTransaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO otp_transactions (txn_id, phone, code, expires_at, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OtpTransaction>(&query)
            .bind(&input.txn_id)
            .bind(&input.phone)
            .bind(&input.code)
            .bind(input.expires_at)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// Consume the most recent live challenge for `(phone, code)`.
    ///
    /// Selection and the `used` flip happen in one statement. `SKIP LOCKED`
    /// plus the outer `used = false` guard mean two concurrent callers can
    /// never both get a row back.
    pub async fn consume(
        pool: &PgPool,
        phone: &str,
        code: &str,
        now: Timestamp,
    ) -> Result<Option<OtpTransaction>, sqlx::Error> {
        let query = format!(
            "UPDATE otp_transactions SET used = true, used_at = $3
             WHERE id = (
                 SELECT id FROM otp_transactions
                 WHERE phone = $1 AND code = $2 AND used = false AND expires_at > $3
                 ORDER BY created_at DESC
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
               AND used = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OtpTransaction>(&query)
            .bind(phone)
            .bind(code)
            .bind(now)
            .fetch_optional(pool)
            .await
    }
}
