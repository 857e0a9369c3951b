//! Handlers for creator onboarding, profile and dashboard.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use streamshort_core::content_status::KYC_PENDING;
use streamshort_core::error::CoreError;
use streamshort_core::roles::ROLE_CREATOR;
use streamshort_core::types::{DbId, Timestamp};
use streamshort_core::validation::require_non_empty;
use streamshort_db::models::analytics::CreatorAnalyticsTotals;
use streamshort_db::models::creator_profile::{
    CreateCreatorProfile, CreatorProfile, UpdateCreatorProfile,
};
use streamshort_db::models::episode::Episode;
use streamshort_db::models::series::Series;

use super::non_blank;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Dashboard window in days.
const DASHBOARD_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct OnboardRequest {
    #[serde(default)]
    pub display_name: String,
    pub bio: Option<String>,
    #[serde(default)]
    pub kyc_document_s3_path: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub kyc_document_s3_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub creator_id: DbId,
    pub since: Timestamp,
    #[serde(flatten)]
    pub totals: CreatorAnalyticsTotals,
}

/// One of the caller's series with all of its live episodes.
#[derive(Debug, Serialize)]
pub struct CreatorSeries {
    #[serde(flatten)]
    pub series: Series,
    pub episodes: Vec<Episode>,
    pub episode_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CreatorContentResponse {
    pub series: Vec<CreatorSeries>,
    pub total: usize,
}

/// POST /api/creators/onboard
pub async fn onboard(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(input): AppJson<OnboardRequest>,
) -> AppResult<(StatusCode, Json<CreatorProfile>)> {
    require_non_empty("display_name", &input.display_name).map_err(CoreError::Validation)?;
    require_non_empty("kyc_document_s3_path", &input.kyc_document_s3_path)
        .map_err(CoreError::Validation)?;

    if state
        .content
        .find_creator_profile_by_user(auth_user.user_id)
        .await?
        .is_some()
    {
        return Err(already_onboarded());
    }

    let create = CreateCreatorProfile {
        user_id: auth_user.user_id,
        display_name: input.display_name.trim().to_string(),
        bio: input.bio.filter(|b| !b.trim().is_empty()),
        kyc_document_s3_path: input.kyc_document_s3_path.trim().to_string(),
    };
    // The unique index still decides when two onboarding requests race.
    let profile = match state.content.create_creator_profile(&create).await {
        Ok(p) => p,
        Err(streamshort_db::StoreError::UniqueViolation(_)) => return Err(already_onboarded()),
        Err(e) => return Err(e.into()),
    };
    // Tokens issued from now on carry the new role.
    state
        .credentials
        .set_user_role(auth_user.user_id, ROLE_CREATOR)
        .await?;

    tracing::info!(user_id = %auth_user.user_id, creator_id = %profile.id, "Creator onboarded");
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/creators/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<CreatorProfile>> {
    let profile = own_profile(&state, auth_user.user_id).await?;
    Ok(Json(profile))
}

/// PUT /api/creators/profile
///
/// A new KYC document puts the profile back into review.
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(input): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<CreatorProfile>> {
    let profile = own_profile(&state, auth_user.user_id).await?;

    let mut update = UpdateCreatorProfile {
        display_name: non_blank(input.display_name),
        bio: non_blank(input.bio),
        kyc_document_s3_path: non_blank(input.kyc_document_s3_path),
        kyc_status: None,
    };
    if update
        .kyc_document_s3_path
        .as_ref()
        .is_some_and(|path| *path != profile.kyc_document_s3_path)
    {
        update.kyc_status = Some(KYC_PENDING.to_string());
    }

    let updated = state
        .content
        .update_creator_profile(profile.id, &update)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Creator profile",
            id: profile.id,
        })?;

    tracing::info!(creator_id = %updated.id, kyc_status = %updated.kyc_status, "Creator profile updated");
    Ok(Json(updated))
}

/// GET /api/creators/{id}/dashboard
///
/// Analytics totals over the last 30 days. Only the owner may read them.
pub async fn dashboard(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppPath(creator_id): AppPath<DbId>,
) -> AppResult<Json<DashboardResponse>> {
    let profile = state
        .ownership
        .creator_profile(auth_user.user_id, creator_id)
        .await?;

    let since = state.clock.now() - Duration::days(DASHBOARD_WINDOW_DAYS);
    let totals = state
        .content
        .creator_analytics_since(profile.id, since)
        .await?;

    Ok(Json(DashboardResponse {
        creator_id: profile.id,
        since,
        totals,
    }))
}

/// GET /api/creators/content
///
/// The caller's own catalog in every status, drafts and unpublished
/// episodes included.
pub async fn content(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<CreatorContentResponse>> {
    let profile = state
        .ownership
        .requester_profile(auth_user.user_id)
        .await?;

    let owned = state.content.list_series_by_creator(profile.id).await?;
    let mut series = Vec::with_capacity(owned.len());
    for item in owned {
        let episodes = state.content.list_episodes(item.id, false).await?;
        series.push(CreatorSeries {
            episode_count: episodes.len(),
            series: item,
            episodes,
        });
    }

    Ok(Json(CreatorContentResponse {
        total: series.len(),
        series,
    }))
}

async fn own_profile(state: &AppState, user_id: DbId) -> AppResult<CreatorProfile> {
    state
        .content
        .find_creator_profile_by_user(user_id)
        .await?
        .ok_or_else(|| CoreError::AccessDenied { entity: "Creator profile" }.into())
}

fn already_onboarded() -> AppError {
    CoreError::Conflict("User is already onboarded as a creator".into()).into()
}
