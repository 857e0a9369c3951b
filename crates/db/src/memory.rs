//! In-process store backing the service and HTTP tests.
//!
//! Every method runs under a single mutex, so the conditional writes
//! (`consume_otp`, `rotate_refresh_token`) are atomic in the same way the
//! SQL statements are. Unique constraints are enforced with the same
//! constraint names the migrations use.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use streamshort_core::content_status::{
    EPISODE_PENDING_UPLOAD, EPISODE_PUBLISHED, KYC_PENDING, SERIES_DRAFT, SERIES_PUBLISHED,
};
use streamshort_core::roles::ROLE_USER;
use streamshort_core::types::{DbId, Timestamp};
use uuid::Uuid;

use crate::models::analytics::{CreatorAnalytics, CreatorAnalyticsTotals};
use crate::models::creator_profile::{CreateCreatorProfile, CreatorProfile, UpdateCreatorProfile};
use crate::models::episode::{CreateEpisode, Episode, UpdateEpisode};
use crate::models::otp::{CreateOtpTransaction, OtpTransaction};
use crate::models::refresh_token::{CreateRefreshToken, RefreshToken};
use crate::models::series::{CreateSeries, Series, SeriesFilter, UpdateSeries};
use crate::models::user::{CreateUser, User};
use crate::store::{constraints, ContentStore, CredentialStore, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    users: HashMap<DbId, User>,
    otps: Vec<OtpTransaction>,
    refresh_tokens: HashMap<String, RefreshToken>,
    profiles: HashMap<DbId, CreatorProfile>,
    analytics: Vec<CreatorAnalytics>,
    /// Insertion order is kept so listings are stable when timestamps tie.
    series: Vec<Series>,
    episodes: Vec<Episode>,
}

impl Inner {
    fn live_user_with(&self, pred: impl Fn(&User) -> bool) -> Option<&User> {
        self.users
            .values()
            .find(|u| u.deleted_at.is_none() && pred(u))
    }

    fn number_taken(&self, series_id: DbId, number: i32, except: Option<DbId>) -> bool {
        self.episodes.iter().any(|e| {
            e.deleted_at.is_none()
                && e.series_id == series_id
                && e.episode_number == number
                && Some(e.id) != except
        })
    }

    fn live_episode_mut(&mut self, id: DbId) -> Option<&mut Episode> {
        self.episodes
            .iter_mut()
            .find(|e| e.id == id && e.deleted_at.is_none())
    }
}

fn unique(constraint: &str) -> StoreError {
    StoreError::UniqueViolation(constraint.to_string())
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a daily analytics row (there is no write path for these in the API).
    pub fn insert_analytics(&self, row: CreatorAnalytics) {
        self.lock().analytics.push(row);
    }

    /// Number of OTP transactions recorded for `phone`, used or not.
    pub fn otp_count(&self, phone: &str) -> usize {
        self.lock().otps.iter().filter(|o| o.phone == phone).count()
    }

    /// Active refresh tokens of a user at `now`.
    pub fn active_refresh_tokens(&self, user_id: DbId, now: Timestamp) -> usize {
        self.lock()
            .refresh_tokens
            .values()
            .filter(|t| t.user_id == user_id && t.is_active(now))
            .count()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        let mut inner = self.lock();
        if let Some(phone) = &input.phone {
            if inner.live_user_with(|u| u.phone.as_ref() == Some(phone)).is_some() {
                return Err(unique(constraints::USERS_PHONE));
            }
        }
        if let Some(email) = &input.email {
            if inner.live_user_with(|u| u.email.as_ref() == Some(email)).is_some() {
                return Err(unique(constraints::USERS_EMAIL));
            }
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            phone: input.phone.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            role: input.role.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(self.lock().live_user_with(|u| u.id == id).cloned())
    }

    async fn find_user_by_phone(&self, phone: &str) -> StoreResult<Option<User>> {
        Ok(self
            .lock()
            .live_user_with(|u| u.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .lock()
            .live_user_with(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_or_create_user_by_phone(&self, phone: &str) -> StoreResult<(User, bool)> {
        if let Some(user) = self.find_user_by_phone(phone).await? {
            return Ok((user, false));
        }
        let input = CreateUser {
            phone: Some(phone.to_string()),
            email: None,
            password_hash: None,
            role: ROLE_USER.to_string(),
        };
        match self.create_user(&input).await {
            Ok(user) => Ok((user, true)),
            // Raced with another creator between the two locks.
            Err(e) if e.is_unique_violation(constraints::USERS_PHONE) => {
                let user = self
                    .find_user_by_phone(phone)
                    .await?
                    .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
                Ok((user, false))
            }
            Err(e) => Err(e),
        }
    }

    async fn set_user_role(&self, id: DbId, role: &str) -> StoreResult<bool> {
        let mut inner = self.lock();
        match inner.users.get_mut(&id) {
            Some(u) if u.deleted_at.is_none() && u.role != role => {
                u.role = role.to_string();
                u.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn deactivate_user(&self, id: DbId) -> StoreResult<bool> {
        let mut inner = self.lock();
        match inner.users.get_mut(&id) {
            Some(u) if u.is_active => {
                u.is_active = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn soft_delete_user(&self, id: DbId) -> StoreResult<bool> {
        let mut inner = self.lock();
        match inner.users.get_mut(&id) {
            Some(u) if u.deleted_at.is_none() => {
                u.deleted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn create_otp(&self, input: &CreateOtpTransaction) -> StoreResult<OtpTransaction> {
        let mut inner = self.lock();
        if inner.otps.iter().any(|o| o.txn_id == input.txn_id) {
            return Err(unique("uq_otp_transactions_txn_id"));
        }
        let txn = OtpTransaction {
            id: Uuid::new_v4(),
            txn_id: input.txn_id.clone(),
            phone: input.phone.clone(),
            code: input.code.clone(),
            expires_at: input.expires_at,
            used: false,
            used_at: None,
            created_at: input.created_at,
        };
        inner.otps.push(txn.clone());
        Ok(txn)
    }

    async fn consume_otp(
        &self,
        phone: &str,
        code: &str,
        now: Timestamp,
    ) -> StoreResult<Option<OtpTransaction>> {
        let mut inner = self.lock();
        // Later pushes win ties on created_at, matching "most recent".
        let target = inner
            .otps
            .iter_mut()
            .enumerate()
            .filter(|(_, o)| o.phone == phone && o.code == code && !o.used && now < o.expires_at)
            .max_by_key(|(i, o)| (o.created_at, *i))
            .map(|(_, o)| o);

        Ok(target.map(|o| {
            o.used = true;
            o.used_at = Some(now);
            o.clone()
        }))
    }

    async fn create_refresh_token(&self, input: &CreateRefreshToken) -> StoreResult<RefreshToken> {
        let mut inner = self.lock();
        if inner.refresh_tokens.contains_key(&input.token_hash) {
            return Err(unique("uq_refresh_tokens_token_hash"));
        }
        let token = RefreshToken {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            token_hash: input.token_hash.clone(),
            expires_at: input.expires_at,
            is_revoked: false,
            created_at: Utc::now(),
        };
        inner
            .refresh_tokens
            .insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_active_refresh_token(
        &self,
        token_hash: &str,
        now: Timestamp,
    ) -> StoreResult<Option<RefreshToken>> {
        Ok(self
            .lock()
            .refresh_tokens
            .get(token_hash)
            .filter(|t| t.is_active(now))
            .cloned())
    }

    async fn rotate_refresh_token(
        &self,
        old_hash: &str,
        replacement: &CreateRefreshToken,
        now: Timestamp,
    ) -> StoreResult<Option<RefreshToken>> {
        let mut inner = self.lock();
        if inner.refresh_tokens.contains_key(&replacement.token_hash) {
            return Err(unique("uq_refresh_tokens_token_hash"));
        }
        match inner.refresh_tokens.get_mut(old_hash) {
            Some(old) if old.is_active(now) => old.is_revoked = true,
            _ => return Ok(None),
        }
        let token = RefreshToken {
            id: Uuid::new_v4(),
            user_id: replacement.user_id,
            token_hash: replacement.token_hash.clone(),
            expires_at: replacement.expires_at,
            is_revoked: false,
            created_at: now,
        };
        inner
            .refresh_tokens
            .insert(token.token_hash.clone(), token.clone());
        Ok(Some(token))
    }

    async fn revoke_refresh_tokens_for_user(&self, user_id: DbId) -> StoreResult<u64> {
        let mut inner = self.lock();
        let mut count = 0;
        for token in inner.refresh_tokens.values_mut() {
            if token.user_id == user_id && !token.is_revoked {
                token.is_revoked = true;
                count += 1;
            }
        }
        Ok(count)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn create_creator_profile(
        &self,
        input: &CreateCreatorProfile,
    ) -> StoreResult<CreatorProfile> {
        let mut inner = self.lock();
        if inner.profiles.values().any(|p| p.user_id == input.user_id) {
            return Err(unique(constraints::CREATOR_PROFILES_USER));
        }
        let now = Utc::now();
        let profile = CreatorProfile {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            display_name: input.display_name.clone(),
            bio: input.bio.clone(),
            kyc_document_s3_path: input.kyc_document_s3_path.clone(),
            kyc_status: KYC_PENDING.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn find_creator_profile(&self, id: DbId) -> StoreResult<Option<CreatorProfile>> {
        Ok(self.lock().profiles.get(&id).cloned())
    }

    async fn find_creator_profile_by_user(
        &self,
        user_id: DbId,
    ) -> StoreResult<Option<CreatorProfile>> {
        Ok(self
            .lock()
            .profiles
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn update_creator_profile(
        &self,
        id: DbId,
        input: &UpdateCreatorProfile,
    ) -> StoreResult<Option<CreatorProfile>> {
        let mut inner = self.lock();
        let Some(profile) = inner.profiles.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = &input.display_name {
            profile.display_name = v.clone();
        }
        if let Some(v) = &input.bio {
            profile.bio = Some(v.clone());
        }
        if let Some(v) = &input.kyc_document_s3_path {
            profile.kyc_document_s3_path = v.clone();
        }
        if let Some(v) = &input.kyc_status {
            profile.kyc_status = v.clone();
        }
        profile.updated_at = Utc::now();
        Ok(Some(profile.clone()))
    }

    async fn creator_analytics_since(
        &self,
        creator_id: DbId,
        since: Timestamp,
    ) -> StoreResult<CreatorAnalyticsTotals> {
        let since_day = since.date_naive();
        let totals = self
            .lock()
            .analytics
            .iter()
            .filter(|a| a.creator_id == creator_id && a.day >= since_day)
            .fold(CreatorAnalyticsTotals::default(), |mut acc, a| {
                acc.views += a.views;
                acc.watch_time_seconds += a.watch_time_seconds;
                acc.earnings += a.earnings;
                acc
            });
        Ok(totals)
    }

    async fn create_series(&self, input: &CreateSeries) -> StoreResult<Series> {
        let now = Utc::now();
        let series = Series {
            id: Uuid::new_v4(),
            creator_id: input.creator_id,
            title: input.title.clone(),
            synopsis: input.synopsis.clone(),
            language: input.language.clone(),
            category_tags: input.category_tags.clone(),
            price_type: input.price_type.clone(),
            price_amount: input.price_amount,
            thumbnail_url: input.thumbnail_url.clone(),
            status: SERIES_DRAFT.to_string(),
            published_at: None,
            created_at: now,
            updated_at: now,
        };
        self.lock().series.push(series.clone());
        Ok(series)
    }

    async fn find_series(&self, id: DbId) -> StoreResult<Option<Series>> {
        Ok(self.lock().series.iter().find(|s| s.id == id).cloned())
    }

    async fn update_series(&self, id: DbId, input: &UpdateSeries) -> StoreResult<Option<Series>> {
        let mut inner = self.lock();
        let Some(series) = inner.series.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(v) = &input.title {
            series.title = v.clone();
        }
        if let Some(v) = &input.synopsis {
            series.synopsis = v.clone();
        }
        if let Some(v) = &input.language {
            series.language = v.clone();
        }
        if let Some(v) = &input.category_tags {
            series.category_tags = v.clone();
        }
        if let Some(v) = &input.price_type {
            series.price_type = v.clone();
        }
        if let Some(v) = input.price_amount {
            series.price_amount = Some(v);
        }
        if let Some(v) = &input.thumbnail_url {
            series.thumbnail_url = Some(v.clone());
        }
        series.updated_at = Utc::now();
        Ok(Some(series.clone()))
    }

    async fn set_series_status(
        &self,
        id: DbId,
        status: &str,
        now: Timestamp,
    ) -> StoreResult<Option<Series>> {
        let mut inner = self.lock();
        let Some(series) = inner.series.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        series.status = status.to_string();
        if status == SERIES_PUBLISHED {
            series.published_at = Some(now);
        }
        series.updated_at = now;
        Ok(Some(series.clone()))
    }

    async fn list_series_by_creator(&self, creator_id: DbId) -> StoreResult<Vec<Series>> {
        let inner = self.lock();
        let mut owned: Vec<(usize, &Series)> = inner
            .series
            .iter()
            .enumerate()
            .filter(|(_, s)| s.creator_id == creator_id)
            .collect();
        owned.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));
        Ok(owned.into_iter().map(|(_, s)| s.clone()).collect())
    }

    async fn list_published_series(
        &self,
        filter: &SeriesFilter,
    ) -> StoreResult<(Vec<Series>, i64)> {
        let inner = self.lock();
        let mut matching: Vec<(usize, &Series)> = inner
            .series
            .iter()
            .enumerate()
            .filter(|(_, s)| s.status == SERIES_PUBLISHED)
            .filter(|(_, s)| filter.language.as_ref().map_or(true, |l| &s.language == l))
            .filter(|(_, s)| {
                filter
                    .category
                    .as_ref()
                    .map_or(true, |c| s.category_tags.contains(c))
            })
            .collect();
        matching.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(filter.offset).unwrap_or(0))
            .take(usize::try_from(filter.limit).unwrap_or(0))
            .map(|(_, s)| s.clone())
            .collect();
        Ok((items, total))
    }

    async fn create_episode(&self, input: &CreateEpisode) -> StoreResult<Episode> {
        let mut inner = self.lock();
        if inner.number_taken(input.series_id, input.episode_number, None) {
            return Err(unique(constraints::EPISODES_SERIES_NUMBER));
        }
        let now = Utc::now();
        let episode = Episode {
            id: Uuid::new_v4(),
            series_id: input.series_id,
            title: input.title.clone(),
            episode_number: input.episode_number,
            duration_seconds: input.duration_seconds,
            status: EPISODE_PENDING_UPLOAD.to_string(),
            published_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        inner.episodes.push(episode.clone());
        Ok(episode)
    }

    async fn find_episode(&self, id: DbId) -> StoreResult<Option<Episode>> {
        Ok(self
            .lock()
            .episodes
            .iter()
            .find(|e| e.id == id && e.deleted_at.is_none())
            .cloned())
    }

    async fn find_episode_by_number(
        &self,
        series_id: DbId,
        number: i32,
    ) -> StoreResult<Option<Episode>> {
        Ok(self
            .lock()
            .episodes
            .iter()
            .find(|e| {
                e.series_id == series_id && e.episode_number == number && e.deleted_at.is_none()
            })
            .cloned())
    }

    async fn update_episode(
        &self,
        id: DbId,
        input: &UpdateEpisode,
    ) -> StoreResult<Option<Episode>> {
        let mut inner = self.lock();
        let Some(series_id) = inner.live_episode_mut(id).map(|e| e.series_id) else {
            return Ok(None);
        };
        if let Some(number) = input.episode_number {
            if inner.number_taken(series_id, number, Some(id)) {
                return Err(unique(constraints::EPISODES_SERIES_NUMBER));
            }
        }
        let Some(episode) = inner.live_episode_mut(id) else {
            return Ok(None);
        };
        if let Some(v) = &input.title {
            episode.title = v.clone();
        }
        if let Some(v) = input.episode_number {
            episode.episode_number = v;
        }
        if let Some(v) = input.duration_seconds {
            episode.duration_seconds = v;
        }
        episode.updated_at = Utc::now();
        Ok(Some(episode.clone()))
    }

    async fn set_episode_status(
        &self,
        id: DbId,
        status: &str,
        now: Timestamp,
    ) -> StoreResult<Option<Episode>> {
        let mut inner = self.lock();
        let Some(episode) = inner.live_episode_mut(id) else {
            return Ok(None);
        };
        episode.status = status.to_string();
        if status == EPISODE_PUBLISHED {
            episode.published_at = Some(now);
        }
        episode.updated_at = now;
        Ok(Some(episode.clone()))
    }

    async fn soft_delete_episode(&self, id: DbId, now: Timestamp) -> StoreResult<bool> {
        let mut inner = self.lock();
        match inner.live_episode_mut(id) {
            Some(episode) => {
                episode.deleted_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_episodes(
        &self,
        series_id: DbId,
        published_only: bool,
    ) -> StoreResult<Vec<Episode>> {
        let mut episodes: Vec<Episode> = self
            .lock()
            .episodes
            .iter()
            .filter(|e| e.series_id == series_id && e.deleted_at.is_none())
            .filter(|e| !published_only || e.status == EPISODE_PUBLISHED)
            .cloned()
            .collect();
        episodes.sort_by_key(|e| e.episode_number);
        Ok(episodes)
    }
}
