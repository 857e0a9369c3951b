//! Episode model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use streamshort_core::types::{DbId, Timestamp};

/// A row from the `episodes` table. Soft-deleted rows are never returned by
/// the store.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Episode {
    pub id: DbId,
    pub series_id: DbId,
    pub title: String,
    pub episode_number: i32,
    pub duration_seconds: i32,
    pub status: String,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(skip_serializing)]
    pub deleted_at: Option<Timestamp>,
}

#[derive(Debug, Clone)]
pub struct CreateEpisode {
    pub series_id: DbId,
    pub title: String,
    pub episode_number: i32,
    pub duration_seconds: i32,
}

/// DTO for updating an episode. Only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateEpisode {
    pub title: Option<String>,
    pub episode_number: Option<i32>,
    pub duration_seconds: Option<i32>,
}

impl UpdateEpisode {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.episode_number.is_none() && self.duration_seconds.is_none()
    }
}
