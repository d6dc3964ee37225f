use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::FollowState;
use crate::error::{ServiceError, ServiceResult};
use crate::repository::SocialRepository;

/// Follow graph operations: the follow index plus the toggle
#[derive(Clone)]
pub struct FollowService {
    repo: Arc<dyn SocialRepository>,
}

impl FollowService {
    pub fn new(repo: Arc<dyn SocialRepository>) -> Self {
        Self { repo }
    }

    /// Ids followed by `user_id`; empty for unknown users.
    /// Always read from storage, never cached.
    pub async fn following_ids_of(&self, user_id: i64) -> ServiceResult<BTreeSet<i64>> {
        let ids: BTreeSet<i64> = self.repo.followed_ids(user_id).await?.into_iter().collect();
        debug!(user_id, following = ids.len(), "Loaded follow index");
        Ok(ids)
    }

    /// Follow `following_username` if not yet followed, otherwise unfollow.
    pub async fn toggle_follow(
        &self,
        follower_id: i64,
        following_username: &str,
    ) -> ServiceResult<FollowState> {
        let target = self
            .repo
            .find_user_by_username(following_username)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user '{following_username}'")))?;

        if target.id == follower_id {
            warn!(user_id = follower_id, "Rejected self-follow");
            return Err(ServiceError::BadRequest("users cannot follow themselves".to_string()));
        }

        if self.repo.find_user_by_id(follower_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("user {follower_id}")));
        }

        let state = FollowState::from(self.repo.toggle_follow_edge(follower_id, target.id).await?);
        info!(
            follower_id,
            following_id = target.id,
            ?state,
            "Follow toggled"
        );
        Ok(state)
    }

    pub async fn is_following(&self, follower_id: i64, following_id: i64) -> ServiceResult<bool> {
        self.repo.is_following(follower_id, following_id).await
    }

    /// Number of users `user_id` follows
    pub async fn count_following(&self, user_id: i64) -> ServiceResult<i64> {
        self.repo.count_following(user_id).await
    }

    /// Number of users following `user_id`
    pub async fn count_followers(&self, user_id: i64) -> ServiceResult<i64> {
        self.repo.count_followers(user_id).await
    }
}
