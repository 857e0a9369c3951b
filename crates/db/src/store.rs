//! Storage seams consumed by the auth and content services.
//!
//! [`CredentialStore`] owns users, OTP challenges and refresh tokens;
//! [`ContentStore`] owns creator profiles, series and episodes. Both are
//! implemented by [`crate::PgStore`] for production and by
//! [`crate::MemoryStore`] for tests.

use async_trait::async_trait;
use streamshort_core::types::{DbId, Timestamp};

use crate::models::analytics::CreatorAnalyticsTotals;
use crate::models::creator_profile::{CreateCreatorProfile, CreatorProfile, UpdateCreatorProfile};
use crate::models::episode::{CreateEpisode, Episode, UpdateEpisode};
use crate::models::otp::{CreateOtpTransaction, OtpTransaction};
use crate::models::refresh_token::{CreateRefreshToken, RefreshToken};
use crate::models::series::{CreateSeries, Series, SeriesFilter, UpdateSeries};
use crate::models::user::{CreateUser, User};

/// Constraint names surfaced through [`StoreError::UniqueViolation`].
pub mod constraints {
    pub const USERS_PHONE: &str = "uq_users_phone";
    pub const USERS_EMAIL: &str = "uq_users_email";
    pub const CREATOR_PROFILES_USER: &str = "uq_creator_profiles_user_id";
    pub const EPISODES_SERIES_NUMBER: &str = "uq_episodes_series_number";
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A write hit a `uq_*` unique constraint. Carries the constraint name.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.starts_with("uq_") {
                        return StoreError::UniqueViolation(constraint.to_string());
                    }
                }
            }
        }
        StoreError::Database(err)
    }
}

impl StoreError {
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        matches!(self, StoreError::UniqueViolation(c) if c == constraint)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Cheap liveness probe for `/health`.
    async fn ping(&self) -> StoreResult<()>;

    // -- users --

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User>;

    /// Live (not soft-deleted) user by id.
    async fn find_user_by_id(&self, id: DbId) -> StoreResult<Option<User>>;

    async fn find_user_by_phone(&self, phone: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Returns the user for `phone`, creating a plain user if none exists.
    /// The flag is `true` when this call created the row.
    async fn find_or_create_user_by_phone(&self, phone: &str) -> StoreResult<(User, bool)>;

    /// Returns `true` if the role changed.
    async fn set_user_role(&self, id: DbId, role: &str) -> StoreResult<bool>;

    async fn deactivate_user(&self, id: DbId) -> StoreResult<bool>;

    async fn soft_delete_user(&self, id: DbId) -> StoreResult<bool>;

    // -- OTP transactions --

    async fn create_otp(&self, input: &CreateOtpTransaction) -> StoreResult<OtpTransaction>;

    /// Atomically mark the most recent unused, unexpired transaction matching
    /// `phone` and `code` as used. Returns `None` if nothing transitioned.
    async fn consume_otp(
        &self,
        phone: &str,
        code: &str,
        now: Timestamp,
    ) -> StoreResult<Option<OtpTransaction>>;

    // -- refresh tokens --

    async fn create_refresh_token(&self, input: &CreateRefreshToken) -> StoreResult<RefreshToken>;

    /// Token with this digest that is not revoked and not expired at `now`.
    async fn find_active_refresh_token(
        &self,
        token_hash: &str,
        now: Timestamp,
    ) -> StoreResult<Option<RefreshToken>>;

    /// Revoke `old_hash` and insert `replacement` in one unit. If the old
    /// token is no longer active nothing is written and `None` is returned.
    async fn rotate_refresh_token(
        &self,
        old_hash: &str,
        replacement: &CreateRefreshToken,
        now: Timestamp,
    ) -> StoreResult<Option<RefreshToken>>;

    /// Revoke every active token of the user. Returns the number revoked.
    async fn revoke_refresh_tokens_for_user(&self, user_id: DbId) -> StoreResult<u64>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    // -- creator profiles --

    async fn create_creator_profile(
        &self,
        input: &CreateCreatorProfile,
    ) -> StoreResult<CreatorProfile>;

    async fn find_creator_profile(&self, id: DbId) -> StoreResult<Option<CreatorProfile>>;

    async fn find_creator_profile_by_user(
        &self,
        user_id: DbId,
    ) -> StoreResult<Option<CreatorProfile>>;

    async fn update_creator_profile(
        &self,
        id: DbId,
        input: &UpdateCreatorProfile,
    ) -> StoreResult<Option<CreatorProfile>>;

    /// Sum of daily analytics rows on or after `since`.
    async fn creator_analytics_since(
        &self,
        creator_id: DbId,
        since: Timestamp,
    ) -> StoreResult<CreatorAnalyticsTotals>;

    // -- series --

    async fn create_series(&self, input: &CreateSeries) -> StoreResult<Series>;

    async fn find_series(&self, id: DbId) -> StoreResult<Option<Series>>;

    async fn update_series(&self, id: DbId, input: &UpdateSeries) -> StoreResult<Option<Series>>;

    /// Set the status. Moving to `published` stamps `published_at = now`;
    /// moving away leaves it untouched.
    async fn set_series_status(
        &self,
        id: DbId,
        status: &str,
        now: Timestamp,
    ) -> StoreResult<Option<Series>>;

    /// Every series of the creator in any status, newest first.
    async fn list_series_by_creator(&self, creator_id: DbId) -> StoreResult<Vec<Series>>;

    /// Published series matching the filter, plus the total match count.
    async fn list_published_series(&self, filter: &SeriesFilter)
        -> StoreResult<(Vec<Series>, i64)>;

    // -- episodes --

    async fn create_episode(&self, input: &CreateEpisode) -> StoreResult<Episode>;

    async fn find_episode(&self, id: DbId) -> StoreResult<Option<Episode>>;

    /// Live episode holding `number` in the series, if any.
    async fn find_episode_by_number(
        &self,
        series_id: DbId,
        number: i32,
    ) -> StoreResult<Option<Episode>>;

    async fn update_episode(&self, id: DbId, input: &UpdateEpisode)
        -> StoreResult<Option<Episode>>;

    /// Same `published_at` semantics as [`ContentStore::set_series_status`].
    async fn set_episode_status(
        &self,
        id: DbId,
        status: &str,
        now: Timestamp,
    ) -> StoreResult<Option<Episode>>;

    async fn soft_delete_episode(&self, id: DbId, now: Timestamp) -> StoreResult<bool>;

    /// Live episodes ordered by number.
    async fn list_episodes(&self, series_id: DbId, published_only: bool)
        -> StoreResult<Vec<Episode>>;
}
