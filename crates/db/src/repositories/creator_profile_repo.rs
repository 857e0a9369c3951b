//! Repository for `creator_profiles` and the `creator_analytics` rollup.

use sqlx::PgPool;
use streamshort_core::types::{DbId, Timestamp};

use crate::models::analytics::CreatorAnalyticsTotals;
use crate::models::creator_profile::{CreateCreatorProfile, CreatorProfile, UpdateCreatorProfile};

const COLUMNS: &str = "id, user_id, display_name, bio, kyc_document_s3_path, kyc_status, \
                        created_at, updated_at";

pub struct CreatorProfileRepo;

impl CreatorProfileRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateCreatorProfile,
    ) -> Result<CreatorProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO creator_profiles (user_id, display_name, bio, kyc_document_s3_path)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CreatorProfile>(&query)
            .bind(input.user_id)
            .bind(&input.display_name)
            .bind(&input.bio)
            .bind(&input.kyc_document_s3_path)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CreatorProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM creator_profiles WHERE id = $1");
        sqlx::query_as::<_, CreatorProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<CreatorProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM creator_profiles WHERE user_id = $1");
        sqlx::query_as::<_, CreatorProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a profile. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCreatorProfile,
    ) -> Result<Option<CreatorProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE creator_profiles SET
                display_name = COALESCE($2, display_name),
                bio = COALESCE($3, bio),
                kyc_document_s3_path = COALESCE($4, kyc_document_s3_path),
                kyc_status = COALESCE($5, kyc_status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CreatorProfile>(&query)
            .bind(id)
            .bind(&input.display_name)
            .bind(&input.bio)
            .bind(&input.kyc_document_s3_path)
            .bind(&input.kyc_status)
            .fetch_optional(pool)
            .await
    }

    /// Sum analytics rows on or after the day of `since`.
    pub async fn analytics_since(
        pool: &PgPool,
        creator_id: DbId,
        since: Timestamp,
    ) -> Result<CreatorAnalyticsTotals, sqlx::Error> {
        sqlx::query_as::<_, CreatorAnalyticsTotals>(
            "SELECT COALESCE(SUM(views), 0)::BIGINT AS views,
                    COALESCE(SUM(watch_time_seconds), 0)::BIGINT AS watch_time_seconds,
                    COALESCE(SUM(earnings), 0)::DOUBLE PRECISION AS earnings
             FROM creator_analytics
             WHERE creator_id = $1 AND day >= $2",
        )
        .bind(creator_id)
        .bind(since.date_naive())
        .fetch_one(pool)
        .await
    }
}
