//! Repository for the `episodes` table.
//!
//! Soft-deleted rows are invisible to every read.

use sqlx::PgPool;
use streamshort_core::content_status::EPISODE_PUBLISHED;
use streamshort_core::types::{DbId, Timestamp};

use crate::models::episode::{CreateEpisode, Episode, UpdateEpisode};

const COLUMNS: &str = "id, series_id, title, episode_number, duration_seconds, status, \
                        published_at, created_at, updated_at, deleted_at";

pub struct EpisodeRepo;

impl EpisodeRepo {
    /// Insert a new episode in `pending_upload`.
    ///
    /// A duplicate live number fails on `uq_episodes_series_number`.
    pub async fn create(pool: &PgPool, input: &CreateEpisode) -> Result<Episode, sqlx::Error> {
        let query = format!(
            "INSERT INTO episodes (series_id, title, episode_number, duration_seconds)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(input.series_id)
            .bind(&input.title)
            .bind(input.episode_number)
            .bind(input.duration_seconds)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Episode>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM episodes WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Episode>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_number(
        pool: &PgPool,
        series_id: DbId,
        number: i32,
    ) -> Result<Option<Episode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM episodes
             WHERE series_id = $1 AND episode_number = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(series_id)
            .bind(number)
            .fetch_optional(pool)
            .await
    }

    /// Update an episode. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEpisode,
    ) -> Result<Option<Episode>, sqlx::Error> {
        let query = format!(
            "UPDATE episodes SET
                title = COALESCE($2, title),
                episode_number = COALESCE($3, episode_number),
                duration_seconds = COALESCE($4, duration_seconds)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.episode_number)
            .bind(input.duration_seconds)
            .fetch_optional(pool)
            .await
    }

    /// Set status; `published_at` is stamped only on a move to `published`.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
        now: Timestamp,
    ) -> Result<Option<Episode>, sqlx::Error> {
        let query = format!(
            "UPDATE episodes SET
                status = $2,
                published_at = CASE WHEN $2 = $4 THEN $3 ELSE published_at END
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(id)
            .bind(status)
            .bind(now)
            .bind(EPISODE_PUBLISHED)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if the row was soft-deleted by this call.
    pub async fn soft_delete(pool: &PgPool, id: DbId, now: Timestamp) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE episodes SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_for_series(
        pool: &PgPool,
        series_id: DbId,
        published_only: bool,
    ) -> Result<Vec<Episode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM episodes
             WHERE series_id = $1
               AND deleted_at IS NULL
               AND (NOT $2 OR status = $3)
             ORDER BY episode_number"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(series_id)
            .bind(published_only)
            .bind(EPISODE_PUBLISHED)
            .fetch_all(pool)
            .await
    }
}
