use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::models::USERNAME_MAX_LEN;
use crate::domain::{NewUser, Profile, ProfileUpdate, Role, User};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::SocialRepository;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn SocialRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn SocialRepository>) -> Self {
        Self { repo }
    }

    /// Register a user. `password_hash` must already be encoded by the caller;
    /// the role falls back to [`Role::User`].
    pub async fn register(&self, new_user: NewUser) -> ServiceResult<User> {
        let username_len = new_user.username.chars().count();
        if username_len == 0 || username_len > USERNAME_MAX_LEN {
            return Err(ServiceError::BadRequest(format!(
                "username must be 1..={USERNAME_MAX_LEN} characters"
            )));
        }
        if new_user.email.trim().is_empty() {
            return Err(ServiceError::BadRequest("email must not be empty".to_string()));
        }
        if self.repo.username_exists(&new_user.username).await? {
            return Err(ServiceError::Conflict(format!(
                "username '{}' is already taken",
                new_user.username
            )));
        }

        let role = new_user.role.unwrap_or_default();
        let username = new_user.username.clone();
        match self.repo.insert_user(new_user, role).await {
            Ok(user) => {
                info!(
                    user_id = user.id,
                    username = %user.username,
                    role = role.as_str(),
                    "Registered user"
                );
                Ok(user)
            }
            Err(err) if err.is_unique_violation() => {
                warn!(%username, "Username taken by a concurrent registration");
                Err(ServiceError::Conflict(format!("username '{username}' is already taken")))
            }
            Err(err) => Err(err),
        }
    }

    pub async fn exists_by_username(&self, username: &str) -> ServiceResult<bool> {
        self.repo.username_exists(username).await
    }

    pub async fn find_by_id(&self, user_id: i64) -> ServiceResult<User> {
        self.repo
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id}")))
    }

    pub async fn find_by_username(&self, username: &str) -> ServiceResult<User> {
        self.repo
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user '{username}'")))
    }

    /// Profile with post, follower and following counts
    pub async fn get_profile(&self, username: &str) -> ServiceResult<Profile> {
        let user = self.find_by_username(username).await?;
        let post_count = self.repo.count_posts_by_user(user.id).await?;
        let follower_count = self.repo.count_followers(user.id).await?;
        let following_count = self.repo.count_following(user.id).await?;

        Ok(Profile {
            id: user.id,
            username: user.username,
            name: user.name,
            bio: user.bio,
            post_count,
            follower_count,
            following_count,
        })
    }

    /// Update mutable profile fields; identity fields never change
    pub async fn update_profile(&self, user_id: i64, update: ProfileUpdate) -> ServiceResult<User> {
        if update.email.as_deref().is_some_and(|e| e.trim().is_empty()) {
            return Err(ServiceError::BadRequest("email must not be empty".to_string()));
        }
        if update.is_empty() {
            return self.find_by_id(user_id).await;
        }

        self.repo
            .update_profile(user_id, update)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id}")))
    }
}
