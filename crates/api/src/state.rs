use std::sync::Arc;

use streamshort_core::clock::Clock;
use streamshort_db::{ContentStore, CredentialStore};

use crate::auth::otp::OtpEngine;
use crate::auth::ownership::OwnershipResolver;
use crate::auth::tokens::TokenService;
use crate::config::ServerConfig;
use crate::sms::SmsSender;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (every field is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Users, OTP transactions and refresh tokens.
    pub credentials: Arc<dyn CredentialStore>,
    /// Creator profiles, series and episodes.
    pub content: Arc<dyn ContentStore>,
    pub clock: Arc<dyn Clock>,
    pub otp: Arc<OtpEngine>,
    pub tokens: Arc<TokenService>,
    pub ownership: Arc<OwnershipResolver>,
}

impl AppState {
    /// Wire the services on top of the given collaborators.
    pub fn new(
        config: ServerConfig,
        credentials: Arc<dyn CredentialStore>,
        content: Arc<dyn ContentStore>,
        sms: Arc<dyn SmsSender>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let otp = OtpEngine::new(
            Arc::clone(&credentials),
            sms,
            Arc::clone(&clock),
            config.otp_ttl,
        );
        let tokens = TokenService::new(&config.jwt, Arc::clone(&credentials), Arc::clone(&clock));
        let ownership = OwnershipResolver::new(Arc::clone(&content));

        Self {
            config: Arc::new(config),
            credentials,
            content,
            clock,
            otp: Arc::new(otp),
            tokens: Arc::new(tokens),
            ownership: Arc::new(ownership),
        }
    }
}
