//! PostgreSQL-backed implementation of the store traits.

use async_trait::async_trait;
use streamshort_core::types::{DbId, Timestamp};

use crate::models::analytics::CreatorAnalyticsTotals;
use crate::models::creator_profile::{CreateCreatorProfile, CreatorProfile, UpdateCreatorProfile};
use crate::models::episode::{CreateEpisode, Episode, UpdateEpisode};
use crate::models::otp::{CreateOtpTransaction, OtpTransaction};
use crate::models::refresh_token::{CreateRefreshToken, RefreshToken};
use crate::models::series::{CreateSeries, Series, SeriesFilter, UpdateSeries};
use crate::models::user::{CreateUser, User};
use crate::repositories::{
    CreatorProfileRepo, EpisodeRepo, OtpRepo, RefreshTokenRepo, SeriesRepo, UserRepo,
};
use crate::store::{ContentStore, CredentialStore, StoreResult};
use crate::DbPool;

/// Store over a shared connection pool. Cheap to clone.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn find_user_by_id(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_phone(&self, phone: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_phone(&self.pool, phone).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn find_or_create_user_by_phone(&self, phone: &str) -> StoreResult<(User, bool)> {
        if let Some(user) = UserRepo::insert_phone_if_absent(&self.pool, phone).await? {
            return Ok((user, true));
        }
        // Lost the insert to an existing row; it must be readable now.
        let user = UserRepo::find_by_phone(&self.pool, phone)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok((user, false))
    }

    async fn set_user_role(&self, id: DbId, role: &str) -> StoreResult<bool> {
        Ok(UserRepo::set_role(&self.pool, id, role).await?)
    }

    async fn deactivate_user(&self, id: DbId) -> StoreResult<bool> {
        Ok(UserRepo::deactivate(&self.pool, id).await?)
    }

    async fn soft_delete_user(&self, id: DbId) -> StoreResult<bool> {
        Ok(UserRepo::soft_delete(&self.pool, id).await?)
    }

    async fn create_otp(&self, input: &CreateOtpTransaction) -> StoreResult<OtpTransaction> {
        Ok(OtpRepo::create(&self.pool, input).await?)
    }

    async fn consume_otp(
        &self,
        phone: &str,
        code: &str,
        now: Timestamp,
    ) -> StoreResult<Option<OtpTransaction>> {
        Ok(OtpRepo::consume(&self.pool, phone, code, now).await?)
    }

    async fn create_refresh_token(&self, input: &CreateRefreshToken) -> StoreResult<RefreshToken> {
        Ok(RefreshTokenRepo::create(&self.pool, input).await?)
    }

    async fn find_active_refresh_token(
        &self,
        token_hash: &str,
        now: Timestamp,
    ) -> StoreResult<Option<RefreshToken>> {
        Ok(RefreshTokenRepo::find_active_by_hash(&self.pool, token_hash, now).await?)
    }

    async fn rotate_refresh_token(
        &self,
        old_hash: &str,
        replacement: &CreateRefreshToken,
        now: Timestamp,
    ) -> StoreResult<Option<RefreshToken>> {
        Ok(RefreshTokenRepo::rotate(&self.pool, old_hash, replacement, now).await?)
    }

    async fn revoke_refresh_tokens_for_user(&self, user_id: DbId) -> StoreResult<u64> {
        Ok(RefreshTokenRepo::revoke_all_for_user(&self.pool, user_id).await?)
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn create_creator_profile(
        &self,
        input: &CreateCreatorProfile,
    ) -> StoreResult<CreatorProfile> {
        Ok(CreatorProfileRepo::create(&self.pool, input).await?)
    }

    async fn find_creator_profile(&self, id: DbId) -> StoreResult<Option<CreatorProfile>> {
        Ok(CreatorProfileRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_creator_profile_by_user(
        &self,
        user_id: DbId,
    ) -> StoreResult<Option<CreatorProfile>> {
        Ok(CreatorProfileRepo::find_by_user_id(&self.pool, user_id).await?)
    }

    async fn update_creator_profile(
        &self,
        id: DbId,
        input: &UpdateCreatorProfile,
    ) -> StoreResult<Option<CreatorProfile>> {
        Ok(CreatorProfileRepo::update(&self.pool, id, input).await?)
    }

    async fn creator_analytics_since(
        &self,
        creator_id: DbId,
        since: Timestamp,
    ) -> StoreResult<CreatorAnalyticsTotals> {
        Ok(CreatorProfileRepo::analytics_since(&self.pool, creator_id, since).await?)
    }

    async fn create_series(&self, input: &CreateSeries) -> StoreResult<Series> {
        Ok(SeriesRepo::create(&self.pool, input).await?)
    }

    async fn find_series(&self, id: DbId) -> StoreResult<Option<Series>> {
        Ok(SeriesRepo::find_by_id(&self.pool, id).await?)
    }

    async fn update_series(&self, id: DbId, input: &UpdateSeries) -> StoreResult<Option<Series>> {
        Ok(SeriesRepo::update(&self.pool, id, input).await?)
    }

    async fn set_series_status(
        &self,
        id: DbId,
        status: &str,
        now: Timestamp,
    ) -> StoreResult<Option<Series>> {
        Ok(SeriesRepo::set_status(&self.pool, id, status, now).await?)
    }

    async fn list_series_by_creator(&self, creator_id: DbId) -> StoreResult<Vec<Series>> {
        Ok(SeriesRepo::list_by_creator(&self.pool, creator_id).await?)
    }

    async fn list_published_series(
        &self,
        filter: &SeriesFilter,
    ) -> StoreResult<(Vec<Series>, i64)> {
        let items = SeriesRepo::list_published(&self.pool, filter).await?;
        let total = SeriesRepo::count_published(&self.pool, filter).await?;
        Ok((items, total))
    }

    async fn create_episode(&self, input: &CreateEpisode) -> StoreResult<Episode> {
        Ok(EpisodeRepo::create(&self.pool, input).await?)
    }

    async fn find_episode(&self, id: DbId) -> StoreResult<Option<Episode>> {
        Ok(EpisodeRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_episode_by_number(
        &self,
        series_id: DbId,
        number: i32,
    ) -> StoreResult<Option<Episode>> {
        Ok(EpisodeRepo::find_by_number(&self.pool, series_id, number).await?)
    }

    async fn update_episode(
        &self,
        id: DbId,
        input: &UpdateEpisode,
    ) -> StoreResult<Option<Episode>> {
        Ok(EpisodeRepo::update(&self.pool, id, input).await?)
    }

    async fn set_episode_status(
        &self,
        id: DbId,
        status: &str,
        now: Timestamp,
    ) -> StoreResult<Option<Episode>> {
        Ok(EpisodeRepo::set_status(&self.pool, id, status, now).await?)
    }

    async fn soft_delete_episode(&self, id: DbId, now: Timestamp) -> StoreResult<bool> {
        Ok(EpisodeRepo::soft_delete(&self.pool, id, now).await?)
    }

    async fn list_episodes(
        &self,
        series_id: DbId,
        published_only: bool,
    ) -> StoreResult<Vec<Episode>> {
        Ok(EpisodeRepo::list_for_series(&self.pool, series_id, published_only).await?)
    }
}
