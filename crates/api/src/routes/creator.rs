//! Route definitions for the `/creators` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::creator;
use crate::state::AppState;

/// Gated routes mounted at `/api/creators`.
///
/// ```text
/// POST /onboard           -> onboard
/// GET  /profile           -> get_profile
/// PUT  /profile           -> update_profile
/// GET  /{id}/dashboard    -> dashboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/onboard", post(creator::onboard))
        .route(
            "/profile",
            get(creator::get_profile).put(creator::update_profile),
        )
        .route("/content", get(creator::content))
        .route("/{id}/dashboard", get(creator::dashboard))
}
