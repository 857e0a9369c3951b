//! Handlers for episodes. Every route resolves the full ownership chain
//! before touching the row.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use streamshort_core::content_status::normalize_episode_status;
use streamshort_core::error::CoreError;
use streamshort_core::types::DbId;
use streamshort_core::validation::{require_non_empty, require_positive};
use streamshort_db::models::episode::{CreateEpisode, Episode, UpdateEpisode};
use streamshort_db::StoreError;

use super::non_blank;
use super::series::StatusRequest;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const DUPLICATE_NUMBER: &str = "Episode number already exists for this series";

#[derive(Debug, Deserialize)]
pub struct CreateEpisodeRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub episode_number: i32,
    #[serde(default)]
    pub duration_seconds: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEpisodeRequest {
    pub title: Option<String>,
    pub episode_number: Option<i32>,
    pub duration_seconds: Option<i32>,
}

/// POST /api/content/series/{id}/episodes
pub async fn create_episode(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppPath(series_id): AppPath<DbId>,
    AppJson(input): AppJson<CreateEpisodeRequest>,
) -> AppResult<(StatusCode, Json<Episode>)> {
    let owned = state.ownership.series(auth_user.user_id, series_id).await?;

    require_non_empty("title", &input.title).map_err(CoreError::Validation)?;
    require_positive("episode_number", input.episode_number).map_err(CoreError::Validation)?;
    require_positive("duration_seconds", input.duration_seconds)
        .map_err(CoreError::Validation)?;

    if state
        .content
        .find_episode_by_number(owned.series.id, input.episode_number)
        .await?
        .is_some()
    {
        return Err(duplicate_number());
    }

    let create = CreateEpisode {
        series_id: owned.series.id,
        title: input.title.trim().to_string(),
        episode_number: input.episode_number,
        duration_seconds: input.duration_seconds,
    };
    let episode = state
        .content
        .create_episode(&create)
        .await
        .map_err(number_conflict)?;

    tracing::info!(
        series_id = %owned.series.id,
        episode_id = %episode.id,
        episode_number = episode.episode_number,
        "Episode created"
    );
    Ok((StatusCode::CREATED, Json(episode)))
}

/// PUT /api/episodes/{id}
pub async fn update_episode(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppPath(episode_id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateEpisodeRequest>,
) -> AppResult<Json<Episode>> {
    let owned = state.ownership.episode(auth_user.user_id, episode_id).await?;

    let update = UpdateEpisode {
        title: non_blank(input.title),
        episode_number: input.episode_number,
        duration_seconds: input.duration_seconds,
    };
    if update.is_empty() {
        return Err(CoreError::Validation("No fields to update".into()).into());
    }
    if let Some(n) = update.episode_number {
        require_positive("episode_number", n).map_err(CoreError::Validation)?;
        let holder = state
            .content
            .find_episode_by_number(owned.series.id, n)
            .await?;
        if holder.is_some_and(|other| other.id != owned.episode.id) {
            return Err(duplicate_number());
        }
    }
    if let Some(d) = update.duration_seconds {
        require_positive("duration_seconds", d).map_err(CoreError::Validation)?;
    }

    let episode = state
        .content
        .update_episode(owned.episode.id, &update)
        .await
        .map_err(number_conflict)?
        .ok_or(CoreError::AccessDenied { entity: "Episode" })?;

    tracing::info!(episode_id = %episode.id, "Episode updated");
    Ok(Json(episode))
}

/// PATCH /api/episodes/{id}/status
pub async fn update_episode_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppPath(episode_id): AppPath<DbId>,
    AppJson(input): AppJson<StatusRequest>,
) -> AppResult<Json<Episode>> {
    let owned = state.ownership.episode(auth_user.user_id, episode_id).await?;
    let status = normalize_episode_status(&input.status).map_err(CoreError::Validation)?;

    let episode = state
        .content
        .set_episode_status(owned.episode.id, status, state.clock.now())
        .await?
        .ok_or(CoreError::AccessDenied { entity: "Episode" })?;

    tracing::info!(episode_id = %episode.id, status, "Episode status changed");
    Ok(Json(episode))
}

/// DELETE /api/episodes/{id}
///
/// Soft delete. The episode number becomes available again.
pub async fn delete_episode(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppPath(episode_id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    let owned = state.ownership.episode(auth_user.user_id, episode_id).await?;

    let deleted = state
        .content
        .soft_delete_episode(owned.episode.id, state.clock.now())
        .await?;
    if !deleted {
        return Err(CoreError::AccessDenied { entity: "Episode" }.into());
    }

    tracing::info!(episode_id = %owned.episode.id, "Episode deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn duplicate_number() -> AppError {
    CoreError::Conflict(DUPLICATE_NUMBER.into()).into()
}

/// A concurrent writer can still win the number between check and write.
fn number_conflict(err: StoreError) -> AppError {
    match err {
        StoreError::UniqueViolation(_) => duplicate_number(),
        other => other.into(),
    }
}
