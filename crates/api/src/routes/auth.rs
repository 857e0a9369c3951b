//! Route definitions for authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Public routes mounted at `/auth`.
///
/// ```text
/// POST /otp/send     -> send_otp
/// POST /otp/verify   -> verify_otp
/// POST /refresh      -> refresh
/// POST /register     -> register
/// POST /login        -> login
/// GET  /verify       -> verify_token
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/otp/send", post(auth::send_otp))
        .route("/otp/verify", post(auth::verify_otp))
        .route("/refresh", post(auth::refresh))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/verify", get(auth::verify_token))
}

/// Gated identity routes, merged under `/api`.
///
/// ```text
/// POST /auth/logout  -> logout
/// GET  /profile      -> profile
/// ```
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/profile", get(auth::profile))
}
