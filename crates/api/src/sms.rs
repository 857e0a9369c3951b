//! Out-of-band OTP delivery.
//!
//! The OTP engine only needs something that accepts `(phone, code)`. Real
//! providers plug in behind [`SmsSender`]; [`LogSmsSender`] is the
//! development implementation.

use async_trait::async_trait;
use streamshort_core::phone::mask_phone;

#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("SMS delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Deliver `code` to `phone`.
    async fn send_otp(&self, phone: &str, code: &str) -> Result<(), SmsError>;
}

/// Writes the code to the log instead of sending it. Development only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send_otp(&self, phone: &str, code: &str) -> Result<(), SmsError> {
        tracing::info!(phone = %mask_phone(phone), %code, "OTP delivery (log sender)");
        Ok(())
    }
}
