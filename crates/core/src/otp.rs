//! One-time code and transaction id generation.

use rand::Rng;
use uuid::Uuid;

/// Number of digits in an OTP code.
pub const OTP_LENGTH: usize = 6;

/// Default lifetime of an OTP challenge in seconds (5 minutes).
pub const DEFAULT_OTP_TTL_SECS: i64 = 300;

/// Prefix of every OTP transaction id.
pub const TXN_ID_PREFIX: &str = "otp_txn_";

/// Generate a numeric code, each digit drawn uniformly from 0-9.
pub fn generate_otp_code() -> String {
    let mut rng = rand::rng();
    (0..OTP_LENGTH)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Generate a transaction id of the form `otp_txn_xxxxxxxx`.
pub fn generate_transaction_id() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("{TXN_ID_PREFIX}{}", &simple[..8])
}

/// Returns `true` if `code` has the shape of an OTP (six ASCII digits).
pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == OTP_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}
