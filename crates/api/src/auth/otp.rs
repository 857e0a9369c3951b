//! OTP engine: issues phone challenges and verifies them exactly once.

use std::sync::Arc;

use chrono::Duration;
use streamshort_core::clock::Clock;
use streamshort_core::error::{AuthError, CoreError};
use streamshort_core::otp::{generate_otp_code, generate_transaction_id, is_well_formed_code};
use streamshort_core::phone::{mask_phone, normalize_phone};
use streamshort_db::models::otp::CreateOtpTransaction;
use streamshort_db::models::user::User;
use streamshort_db::{CredentialStore, StoreError};

use crate::error::{AppError, AppResult};
use crate::sms::SmsSender;

/// Attempts at drawing a fresh transaction id before giving up.
const TXN_ID_ATTEMPTS: usize = 3;

/// A freshly created challenge.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub txn_id: String,
    pub phone: String,
    /// Seconds until the code expires.
    pub expires_in: i64,
}

/// Outcome of a successful verification.
#[derive(Debug, Clone)]
pub struct VerifiedUser {
    pub user: User,
    /// `true` when this verification created the account.
    pub newly_created: bool,
}

pub struct OtpEngine {
    credentials: Arc<dyn CredentialStore>,
    sms: Arc<dyn SmsSender>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl OtpEngine {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sms: Arc<dyn SmsSender>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            credentials,
            sms,
            clock,
            ttl,
        }
    }

    /// Create a new challenge for `phone` and hand the code to the SMS sender.
    ///
    /// Earlier challenges for the same phone stay valid until used or expired.
    /// Delivery failures are logged and not reported to the caller.
    pub async fn request_otp(&self, phone: &str) -> AppResult<OtpChallenge> {
        let phone = normalize_phone(phone).map_err(CoreError::Validation)?;
        let code = generate_otp_code();
        let now = self.clock.now();

        let mut attempt = 0;
        let txn = loop {
            attempt += 1;
            let input = CreateOtpTransaction {
                txn_id: generate_transaction_id(),
                phone: phone.clone(),
                code: code.clone(),
                expires_at: now + self.ttl,
                created_at: now,
            };
            match self.credentials.create_otp(&input).await {
                Ok(txn) => break txn,
                Err(StoreError::UniqueViolation(_)) if attempt < TXN_ID_ATTEMPTS => continue,
                Err(e) => return Err(e.into()),
            }
        };

        if let Err(e) = self.sms.send_otp(&phone, &code).await {
            tracing::warn!(phone = %mask_phone(&phone), txn_id = %txn.txn_id, error = %e, "OTP delivery failed");
        }

        tracing::info!(phone = %mask_phone(&phone), txn_id = %txn.txn_id, "OTP challenge created");

        Ok(OtpChallenge {
            txn_id: txn.txn_id,
            phone,
            expires_in: self.ttl.num_seconds(),
        })
    }

    /// Consume the most recent live challenge matching `phone` and `code`
    /// and return the (possibly new) user behind the phone.
    ///
    /// Wrong, expired and already-used codes all fail with
    /// [`AuthError::InvalidOtp`].
    pub async fn verify_otp(&self, phone: &str, code: &str) -> AppResult<VerifiedUser> {
        if phone.trim().is_empty() || code.trim().is_empty() {
            return Err(CoreError::Validation("Phone and OTP are required".into()).into());
        }
        let phone = normalize_phone(phone).map_err(CoreError::Validation)?;
        let code = code.trim();

        if !is_well_formed_code(code) {
            return Err(AuthError::InvalidOtp.into());
        }

        let now = self.clock.now();
        let Some(txn) = self.credentials.consume_otp(&phone, code, now).await? else {
            tracing::info!(phone = %mask_phone(&phone), "OTP verification failed");
            return Err(AuthError::InvalidOtp.into());
        };

        let (user, newly_created) = self
            .credentials
            .find_or_create_user_by_phone(&phone)
            .await?;

        if !user.is_active {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is deactivated".into(),
            )));
        }

        tracing::info!(
            user_id = %user.id,
            txn_id = %txn.txn_id,
            newly_created,
            "OTP verified"
        );

        Ok(VerifiedUser {
            user,
            newly_created,
        })
    }
}
