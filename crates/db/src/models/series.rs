//! Series model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use streamshort_core::types::{DbId, Timestamp};

/// A row from the `series` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Series {
    pub id: DbId,
    pub creator_id: DbId,
    pub title: String,
    pub synopsis: String,
    pub language: String,
    pub category_tags: Vec<String>,
    pub price_type: String,
    pub price_amount: Option<f64>,
    pub thumbnail_url: Option<String>,
    pub status: String,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a series. `creator_id` always comes from the caller's
/// own profile.
#[derive(Debug, Clone)]
pub struct CreateSeries {
    pub creator_id: DbId,
    pub title: String,
    pub synopsis: String,
    pub language: String,
    pub category_tags: Vec<String>,
    pub price_type: String,
    pub price_amount: Option<f64>,
    pub thumbnail_url: Option<String>,
}

/// DTO for updating a series. Only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateSeries {
    pub title: Option<String>,
    pub synopsis: Option<String>,
    pub language: Option<String>,
    pub category_tags: Option<Vec<String>>,
    pub price_type: Option<String>,
    pub price_amount: Option<f64>,
    pub thumbnail_url: Option<String>,
}

/// Filter for the public series listing.
#[derive(Debug, Clone, Default)]
pub struct SeriesFilter {
    pub language: Option<String>,
    pub category: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
