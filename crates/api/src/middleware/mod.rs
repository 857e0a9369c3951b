//! Request gate for protected routes.
//!
//! - [`auth::require_auth`] -- validates the bearer token and stores the identity.
//! - [`auth::AuthUser`] -- reads that identity in handlers.

pub mod auth;
