//! Ownership-chain authorization for creator content.
//!
//! Mutations on creator content are allowed only when the chain
//! `episode -> series -> creator profile -> user` ends at the requester.
//! Each hop is loaded from the store; nothing supplied by the client is
//! trusted. A broken chain and a foreign owner produce the same
//! [`CoreError::AccessDenied`], so callers cannot probe for other users'
//! resources.

use std::sync::Arc;

use streamshort_core::error::CoreError;
use streamshort_core::types::DbId;
use streamshort_db::models::creator_profile::CreatorProfile;
use streamshort_db::models::episode::Episode;
use streamshort_db::models::series::Series;
use streamshort_db::ContentStore;

use crate::error::AppResult;

const CREATOR_PROFILE: &str = "Creator profile";
const SERIES: &str = "Series";
const EPISODE: &str = "Episode";

/// A series together with the profile that owns it.
#[derive(Debug, Clone)]
pub struct OwnedSeries {
    pub profile: CreatorProfile,
    pub series: Series,
}

/// An episode together with its series and owning profile.
#[derive(Debug, Clone)]
pub struct OwnedEpisode {
    pub profile: CreatorProfile,
    pub series: Series,
    pub episode: Episode,
}

pub struct OwnershipResolver {
    content: Arc<dyn ContentStore>,
}

impl OwnershipResolver {
    pub fn new(content: Arc<dyn ContentStore>) -> Self {
        Self { content }
    }

    /// The requester's own creator profile; required before creating content.
    pub async fn requester_profile(&self, requester: DbId) -> AppResult<CreatorProfile> {
        self.content
            .find_creator_profile_by_user(requester)
            .await?
            .ok_or_else(|| {
                CoreError::Forbidden("User must be onboarded as a creator first".into()).into()
            })
    }

    /// `profile.user_id == requester`.
    pub async fn creator_profile(
        &self,
        requester: DbId,
        creator_id: DbId,
    ) -> AppResult<CreatorProfile> {
        let profile = self
            .content
            .find_creator_profile(creator_id)
            .await?
            .filter(|p| p.user_id == requester);
        profile.ok_or_else(|| denied(CREATOR_PROFILE, requester, creator_id))
    }

    /// Series -> creator profile -> user.
    pub async fn series(&self, requester: DbId, series_id: DbId) -> AppResult<OwnedSeries> {
        let Some(series) = self.content.find_series(series_id).await? else {
            return Err(denied(SERIES, requester, series_id));
        };
        let profile = self.owner_of(&series, requester).await?;
        match profile {
            Some(profile) => Ok(OwnedSeries { profile, series }),
            None => Err(denied(SERIES, requester, series_id)),
        }
    }

    /// Episode -> series -> creator profile -> user.
    pub async fn episode(&self, requester: DbId, episode_id: DbId) -> AppResult<OwnedEpisode> {
        let Some(episode) = self.content.find_episode(episode_id).await? else {
            return Err(denied(EPISODE, requester, episode_id));
        };
        let Some(series) = self.content.find_series(episode.series_id).await? else {
            return Err(denied(EPISODE, requester, episode_id));
        };
        match self.owner_of(&series, requester).await? {
            Some(profile) => Ok(OwnedEpisode {
                profile,
                series,
                episode,
            }),
            None => Err(denied(EPISODE, requester, episode_id)),
        }
    }

    /// The series' creator profile if it belongs to `requester`.
    async fn owner_of(&self, series: &Series, requester: DbId) -> AppResult<Option<CreatorProfile>> {
        Ok(self
            .content
            .find_creator_profile(series.creator_id)
            .await?
            .filter(|p| p.user_id == requester))
    }
}

fn denied(entity: &'static str, requester: DbId, target: DbId) -> crate::error::AppError {
    tracing::debug!(entity, requester = %requester, target = %target, "Ownership check failed");
    CoreError::AccessDenied { entity }.into()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use streamshort_db::models::creator_profile::CreateCreatorProfile;
    use streamshort_db::models::episode::CreateEpisode;
    use streamshort_db::models::series::CreateSeries;
    use streamshort_db::MemoryStore;
    use uuid::Uuid;

    use super::*;
    use crate::error::AppError;

    struct World {
        resolver: OwnershipResolver,
        owner: DbId,
        stranger: DbId,
        profile: CreatorProfile,
        series: Series,
        episode: Episode,
    }

    async fn world() -> World {
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let profile = store
            .create_creator_profile(&CreateCreatorProfile {
                user_id: owner,
                display_name: "Owner".into(),
                bio: None,
                kyc_document_s3_path: "s3://kyc/owner".into(),
            })
            .await
            .unwrap();
        let series = store
            .create_series(&CreateSeries {
                creator_id: profile.id,
                title: "Mine".into(),
                synopsis: "S".into(),
                language: "en".into(),
                category_tags: vec![],
                price_type: "free".into(),
                price_amount: None,
                thumbnail_url: None,
            })
            .await
            .unwrap();
        let episode = store
            .create_episode(&CreateEpisode {
                series_id: series.id,
                title: "Pilot".into(),
                episode_number: 1,
                duration_seconds: 60,
            })
            .await
            .unwrap();

        World {
            resolver: OwnershipResolver::new(store),
            owner,
            stranger,
            profile,
            series,
            episode,
        }
    }

    fn denial_message(err: AppError) -> String {
        match err {
            AppError::Core(e @ CoreError::AccessDenied { .. }) => e.to_string(),
            other => panic!("expected AccessDenied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn owner_resolves_full_chain() {
        let w = world().await;
        let owned = w.resolver.episode(w.owner, w.episode.id).await.unwrap();
        assert_eq!(owned.series.id, w.series.id);
        assert_eq!(owned.profile.id, w.profile.id);

        assert!(w.resolver.series(w.owner, w.series.id).await.is_ok());
        assert!(w.resolver.creator_profile(w.owner, w.profile.id).await.is_ok());
    }

    #[tokio::test]
    async fn foreign_series_looks_like_missing_series() {
        let w = world().await;
        let foreign = w.resolver.series(w.stranger, w.series.id).await.unwrap_err();
        let missing = w.resolver.series(w.owner, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(denial_message(foreign), denial_message(missing));
    }

    #[tokio::test]
    async fn foreign_episode_looks_like_missing_episode() {
        let w = world().await;
        let foreign = w.resolver.episode(w.stranger, w.episode.id).await.unwrap_err();
        let missing = w.resolver.episode(w.stranger, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(denial_message(foreign), denial_message(missing));
    }

    #[tokio::test]
    async fn foreign_dashboard_denied() {
        let w = world().await;
        assert_matches!(
            w.resolver.creator_profile(w.stranger, w.profile.id).await,
            Err(AppError::Core(CoreError::AccessDenied { entity: "Creator profile" }))
        );
    }

    #[tokio::test]
    async fn requester_without_profile_is_forbidden() {
        let w = world().await;
        assert_matches!(
            w.resolver.requester_profile(w.stranger).await,
            Err(AppError::Core(CoreError::Forbidden(_)))
        );
        assert_eq!(
            w.resolver.requester_profile(w.owner).await.unwrap().id,
            w.profile.id
        );
    }
}
