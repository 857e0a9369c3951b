//! Repository for the `series` table.

use sqlx::PgPool;
use streamshort_core::content_status::SERIES_PUBLISHED;
use streamshort_core::types::{DbId, Timestamp};

use crate::models::series::{CreateSeries, Series, SeriesFilter, UpdateSeries};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, creator_id, title, synopsis, language, category_tags, price_type, \
                        price_amount, thumbnail_url, status, published_at, created_at, updated_at";

/// Shared WHERE clause for the public listing. `$1` = language, `$2` = category.
const PUBLISHED_FILTER: &str = "status = 'published'
    AND ($1::TEXT IS NULL OR language = $1)
    AND ($2::TEXT IS NULL OR $2 = ANY(category_tags))";

/// Provides CRUD operations for series.
pub struct SeriesRepo;

impl SeriesRepo {
    /// Insert a new series in `draft`, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSeries) -> Result<Series, sqlx::Error> {
        let query = format!(
            "INSERT INTO series (creator_id, title, synopsis, language, category_tags,
                                 price_type, price_amount, thumbnail_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Series>(&query)
            .bind(input.creator_id)
            .bind(&input.title)
            .bind(&input.synopsis)
            .bind(&input.language)
            .bind(&input.category_tags)
            .bind(&input.price_type)
            .bind(input.price_amount)
            .bind(&input.thumbnail_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Series>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM series WHERE id = $1");
        sqlx::query_as::<_, Series>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a series. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSeries,
    ) -> Result<Option<Series>, sqlx::Error> {
        let query = format!(
            "UPDATE series SET
                title = COALESCE($2, title),
                synopsis = COALESCE($3, synopsis),
                language = COALESCE($4, language),
                category_tags = COALESCE($5, category_tags),
                price_type = COALESCE($6, price_type),
                price_amount = COALESCE($7, price_amount),
                thumbnail_url = COALESCE($8, thumbnail_url)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Series>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.synopsis)
            .bind(&input.language)
            .bind(&input.category_tags)
            .bind(&input.price_type)
            .bind(input.price_amount)
            .bind(&input.thumbnail_url)
            .fetch_optional(pool)
            .await
    }

    /// Set status; `published_at` is stamped only on a move to `published`.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
        now: Timestamp,
    ) -> Result<Option<Series>, sqlx::Error> {
        let query = format!(
            "UPDATE series SET
                status = $2,
                published_at = CASE WHEN $2 = $4 THEN $3 ELSE published_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Series>(&query)
            .bind(id)
            .bind(status)
            .bind(now)
            .bind(SERIES_PUBLISHED)
            .fetch_optional(pool)
            .await
    }

    /// All series owned by a creator profile regardless of status, newest first.
    pub async fn list_by_creator(
        pool: &PgPool,
        creator_id: DbId,
    ) -> Result<Vec<Series>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM series
             WHERE creator_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Series>(&query)
            .bind(creator_id)
            .fetch_all(pool)
            .await
    }

    /// Page through published series, newest first.
    pub async fn list_published(
        pool: &PgPool,
        filter: &SeriesFilter,
    ) -> Result<Vec<Series>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM series
             WHERE {PUBLISHED_FILTER}
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Series>(&query)
            .bind(&filter.language)
            .bind(&filter.category)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Count published series matching the filter (ignores limit/offset).
    pub async fn count_published(pool: &PgPool, filter: &SeriesFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM series WHERE {PUBLISHED_FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(&filter.language)
            .bind(&filter.category)
            .fetch_one(pool)
            .await
    }
}
