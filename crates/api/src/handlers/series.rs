//! Handlers for series: creator-side mutations and public catalog reads.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use streamshort_core::content_status::{
    normalize_price_type, normalize_series_status, SERIES_PUBLISHED,
};
use streamshort_core::error::CoreError;
use streamshort_core::types::DbId;
use streamshort_core::validation::require_non_empty;
use streamshort_db::models::episode::Episode;
use streamshort_db::models::series::{CreateSeries, Series, SeriesFilter, UpdateSeries};

use super::non_blank;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateSeriesRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub synopsis: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub category_tags: Vec<String>,
    pub price_type: Option<String>,
    pub price_amount: Option<f64>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSeriesRequest {
    pub title: Option<String>,
    pub synopsis: Option<String>,
    pub language: Option<String>,
    pub category_tags: Option<Vec<String>>,
    pub price_type: Option<String>,
    pub price_amount: Option<f64>,
    pub thumbnail_url: Option<String>,
    pub status: Option<String>,
}

/// Body of the series and episode status endpoints.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

/// Query parameters for `GET /content/series`.
#[derive(Debug, Deserialize)]
pub struct ListSeriesParams {
    pub language: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SeriesPage {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub items: Vec<Series>,
}

/// A published series with its published episodes.
#[derive(Debug, Serialize)]
pub struct SeriesDetail {
    #[serde(flatten)]
    pub series: Series,
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Serialize)]
pub struct EpisodeList {
    pub series_id: DbId,
    pub episodes: Vec<Episode>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Creator-side
// ---------------------------------------------------------------------------

/// POST /api/content/series
///
/// The owning creator is always the caller's own profile.
pub async fn create_series(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(input): AppJson<CreateSeriesRequest>,
) -> AppResult<(StatusCode, Json<Series>)> {
    let profile = state.ownership.requester_profile(auth_user.user_id).await?;

    require_non_empty("title", &input.title).map_err(CoreError::Validation)?;
    require_non_empty("synopsis", &input.synopsis).map_err(CoreError::Validation)?;
    require_non_empty("language", &input.language).map_err(CoreError::Validation)?;
    let price_type =
        normalize_price_type(input.price_type.as_deref()).map_err(CoreError::Validation)?;
    validate_price_amount(input.price_amount)?;

    let create = CreateSeries {
        creator_id: profile.id,
        title: input.title.trim().to_string(),
        synopsis: input.synopsis.trim().to_string(),
        language: input.language.trim().to_string(),
        category_tags: clean_tags(input.category_tags),
        price_type: price_type.to_string(),
        price_amount: input.price_amount,
        thumbnail_url: input.thumbnail_url,
    };
    let series = state.content.create_series(&create).await?;

    tracing::info!(creator_id = %profile.id, series_id = %series.id, "Series created");
    Ok((StatusCode::CREATED, Json(series)))
}

/// PUT /api/content/series/{id}
///
/// Partial update. A `status` field goes through the status allow-list.
pub async fn update_series(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppPath(series_id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateSeriesRequest>,
) -> AppResult<Json<Series>> {
    let owned = state.ownership.series(auth_user.user_id, series_id).await?;

    let status = input
        .status
        .as_deref()
        .map(normalize_series_status)
        .transpose()
        .map_err(CoreError::Validation)?;
    let price_type = match input.price_type.as_deref() {
        Some(raw) => Some(normalize_price_type(Some(raw)).map_err(CoreError::Validation)?),
        None => None,
    };
    validate_price_amount(input.price_amount)?;

    let update = UpdateSeries {
        title: non_blank(input.title),
        synopsis: non_blank(input.synopsis),
        language: non_blank(input.language),
        category_tags: input.category_tags.map(clean_tags),
        price_type: price_type.map(str::to_string),
        price_amount: input.price_amount,
        thumbnail_url: input.thumbnail_url,
    };

    let mut series = state
        .content
        .update_series(owned.series.id, &update)
        .await?
        .ok_or(CoreError::AccessDenied { entity: "Series" })?;

    if let Some(status) = status {
        series = set_status(&state, series.id, status).await?;
    }

    tracing::info!(series_id = %series.id, "Series updated");
    Ok(Json(series))
}

/// PATCH /api/content/series/{id}/status
pub async fn update_series_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppPath(series_id): AppPath<DbId>,
    AppJson(input): AppJson<StatusRequest>,
) -> AppResult<Json<Series>> {
    let owned = state.ownership.series(auth_user.user_id, series_id).await?;
    let status = normalize_series_status(&input.status).map_err(CoreError::Validation)?;

    let series = set_status(&state, owned.series.id, status).await?;
    Ok(Json(series))
}

// ---------------------------------------------------------------------------
// Public catalog
// ---------------------------------------------------------------------------

/// GET /content/series
pub async fn list_series(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListSeriesParams>,
) -> AppResult<Json<SeriesPage>> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);

    let filter = SeriesFilter {
        language: non_blank(params.language),
        category: non_blank(params.category),
        limit: per_page,
        offset: (page - 1).saturating_mul(per_page),
    };
    let (items, total) = state.content.list_published_series(&filter).await?;

    Ok(Json(SeriesPage {
        total,
        page,
        per_page,
        items,
    }))
}

/// GET /content/series/{id}
pub async fn get_series(
    State(state): State<AppState>,
    AppPath(series_id): AppPath<DbId>,
) -> AppResult<Json<SeriesDetail>> {
    let series = published_series(&state, series_id).await?;
    let episodes = state.content.list_episodes(series.id, true).await?;
    Ok(Json(SeriesDetail { series, episodes }))
}

/// GET /content/series/{id}/episodes
pub async fn list_series_episodes(
    State(state): State<AppState>,
    AppPath(series_id): AppPath<DbId>,
) -> AppResult<Json<EpisodeList>> {
    let series = published_series(&state, series_id).await?;
    let episodes = state.content.list_episodes(series.id, true).await?;
    Ok(Json(EpisodeList {
        series_id: series.id,
        total: episodes.len(),
        episodes,
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn set_status(state: &AppState, series_id: DbId, status: &str) -> AppResult<Series> {
    let series = state
        .content
        .set_series_status(series_id, status, state.clock.now())
        .await?
        .ok_or(CoreError::AccessDenied { entity: "Series" })?;
    tracing::info!(series_id = %series_id, status, "Series status changed");
    Ok(series)
}

/// Drafts are invisible on public reads.
async fn published_series(state: &AppState, series_id: DbId) -> AppResult<Series> {
    state
        .content
        .find_series(series_id)
        .await?
        .filter(|s| s.status == SERIES_PUBLISHED)
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Series",
                id: series_id,
            }
            .into()
        })
}

fn validate_price_amount(amount: Option<f64>) -> AppResult<()> {
    match amount {
        Some(a) if !a.is_finite() || a < 0.0 => Err(CoreError::Validation(
            "price_amount must be a non-negative number".into(),
        )
        .into()),
        _ => Ok(()),
    }
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_trimmed_lowercased_and_blank_dropped() {
        let tags = vec![" Drama ".to_string(), "".to_string(), "THRILLER".to_string()];
        assert_eq!(clean_tags(tags), vec!["drama", "thriller"]);
    }

    #[test]
    fn negative_price_rejected() {
        assert!(validate_price_amount(Some(-1.0)).is_err());
        assert!(validate_price_amount(Some(f64::NAN)).is_err());
        assert!(validate_price_amount(Some(0.0)).is_ok());
        assert!(validate_price_amount(None).is_ok());
    }
}
