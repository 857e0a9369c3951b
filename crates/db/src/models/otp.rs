//! OTP transaction model and DTOs.

use sqlx::FromRow;
use streamshort_core::types::{DbId, Timestamp};

/// A row from the `otp_transactions` table.
///
/// A code is usable only while `used = false` and `now < expires_at`.
#[derive(Debug, Clone, FromRow)]
pub struct OtpTransaction {
    pub id: DbId,
    pub txn_id: String,
    pub phone: String,
    pub code: String,
    pub expires_at: Timestamp,
    pub used: bool,
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a new OTP challenge.
#[derive(Debug, Clone)]
pub struct CreateOtpTransaction {
    pub txn_id: String,
    pub phone: String,
    pub code: String,
    pub expires_at: Timestamp,
    /// Insertion time; also used to pick the most recent match on verify.
    pub created_at: Timestamp,
}
