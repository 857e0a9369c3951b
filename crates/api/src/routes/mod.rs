pub mod auth;
pub mod content;
pub mod creator;
pub mod health;

use axum::middleware;
use axum::Router;

use crate::middleware::auth::require_auth;
use crate::state::AppState;

/// Build the public and gated route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/otp/send                              request OTP (public)
/// /auth/otp/verify                            verify OTP, issue tokens (public)
/// /auth/refresh                               rotate refresh token (public)
/// /auth/register                              email/password sign-up (public)
/// /auth/login                                 email/password login (public)
/// /auth/verify                                access token introspection (public)
///
/// /content/series                             published catalog (public)
/// /content/series/{id}                        series with episodes (public)
/// /content/series/{id}/episodes               published episodes (public)
///
/// /api/auth/logout                            revoke refresh tokens
/// /api/profile                                identity echo
///
/// /api/creators/onboard                       create creator profile
/// /api/creators/profile                       get, update own profile
/// /api/creators/content                       own series and episodes, any status
/// /api/creators/{id}/dashboard                30-day analytics (owner only)
///
/// /api/content/series                         create series
/// /api/content/series/{id}                    update series (owner only)
/// /api/content/series/{id}/status             change status (owner only)
/// /api/content/series/{id}/episodes           create episode (owner only)
///
/// /api/episodes/{id}                          update, delete (owner only)
/// /api/episodes/{id}/status                   change status (owner only)
/// ```
///
/// Everything under `/api` passes through [`require_auth`] first.
pub fn app_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(auth::protected_router())
        .nest("/creators", creator::router())
        .merge(content::protected_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .nest("/auth", auth::router())
        .nest("/content", content::public_router())
        .nest("/api", protected)
}
