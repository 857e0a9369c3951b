//! Route definitions for series and episodes.

use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::handlers::{episode, series};
use crate::state::AppState;

/// Public catalog mounted at `/content`.
///
/// ```text
/// GET /series                  -> list_series (published only)
/// GET /series/{id}             -> get_series
/// GET /series/{id}/episodes    -> list_series_episodes
/// ```
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/series", get(series::list_series))
        .route("/series/{id}", get(series::get_series))
        .route("/series/{id}/episodes", get(series::list_series_episodes))
}

/// Gated creator routes, merged under `/api`.
///
/// ```text
/// POST   /content/series                  -> create_series
/// PUT    /content/series/{id}             -> update_series
/// PATCH  /content/series/{id}/status      -> update_series_status
/// POST   /content/series/{id}/episodes    -> create_episode
/// PUT    /episodes/{id}                   -> update_episode
/// DELETE /episodes/{id}                   -> delete_episode
/// PATCH  /episodes/{id}/status            -> update_episode_status
/// ```
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/content/series", post(series::create_series))
        .route("/content/series/{id}", put(series::update_series))
        .route(
            "/content/series/{id}/status",
            patch(series::update_series_status),
        )
        .route(
            "/content/series/{id}/episodes",
            post(episode::create_episode),
        )
        .route(
            "/episodes/{id}",
            put(episode::update_episode).delete(episode::delete_episode),
        )
        .route("/episodes/{id}/status", patch(episode::update_episode_status))
}
