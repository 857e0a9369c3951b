//! Authentication and authorization primitives.
//!
//! - [`jwt`] -- HS256 access-token signing and verification.
//! - [`password`] -- Argon2id password hashing for the email/password flow.
//! - [`otp`] -- the OTP engine: challenge issuance and single-use verification.
//! - [`tokens`] -- the token service: issue, refresh (rotate), verify, revoke.
//! - [`ownership`] -- ownership-chain resolution for creator content.

pub mod jwt;
pub mod otp;
pub mod ownership;
pub mod password;
pub mod tokens;
