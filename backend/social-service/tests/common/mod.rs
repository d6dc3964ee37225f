//! Shared fixtures for integration tests
//!
//! Builds services over the in-memory repository and wraps it in a counting
//! decorator so tests can verify how many storage calls an operation made.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use social_service::domain::{
    Comment, EdgeChange, FeedCursor, FeedPost, NewComment, NewPost, NewUser, Post, ProfileUpdate,
    Role, User,
};
use social_service::{
    FeedConfig, MemorySocialRepository, ServiceResult, SocialRepository, SocialServices,
};

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

pub fn user(id: i64, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        name: None,
        password_hash: "$argon2id$v=19$fixture".to_string(),
        email: format!("{username}@example.com"),
        role: Role::User,
        bio: String::new(),
        created_at: ts(0),
        updated_at: ts(0),
    }
}

pub fn post(id: i64, author_id: i64, secs: i64, content: &str) -> Post {
    Post {
        id,
        user_id: author_id,
        content: content.to_string(),
        image_url: None,
        created_at: ts(secs),
        updated_at: ts(secs),
    }
}

pub fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        name: None,
        password_hash: "$argon2id$v=19$fixture".to_string(),
        email: format!("{username}@example.com"),
        bio: String::new(),
        role: None,
    }
}

pub fn ids(page: &[FeedPost]) -> Vec<i64> {
    page.iter().map(|p| p.id).collect()
}

/// In-memory store plus services wired to it
pub struct Fixture {
    pub repo: Arc<CountingRepository>,
    pub services: SocialServices,
}

impl Fixture {
    pub async fn with_users(users: &[(i64, &str)]) -> Self {
        Self::with_config(users, FeedConfig::default()).await
    }

    pub async fn with_config(users: &[(i64, &str)], config: FeedConfig) -> Self {
        let repo = Arc::new(CountingRepository::new(MemorySocialRepository::new()));
        for (id, name) in users {
            repo.inner.seed_user(user(*id, name)).await.unwrap();
        }
        let dyn_repo: Arc<dyn SocialRepository> = repo.clone();
        Self {
            repo,
            services: SocialServices::new(dyn_repo, config),
        }
    }

    pub async fn seed_post(&self, id: i64, author_id: i64, secs: i64, content: &str) {
        self.repo
            .inner
            .seed_post(post(id, author_id, secs, content))
            .await
            .unwrap();
    }

    pub async fn follow(&self, follower_id: i64, following_id: i64) {
        let change = self
            .repo
            .toggle_follow_edge(follower_id, following_id)
            .await
            .unwrap();
        assert_eq!(change, EdgeChange::Created);
    }
}

/// Decorator that counts selected storage calls
pub struct CountingRepository {
    pub inner: MemorySocialRepository,
    pub user_lookups: AtomicUsize,
    pub post_queries: AtomicUsize,
    /// When set, the next comment insert first deletes its post
    pub delete_post_before_comment: AtomicBool,
}

impl CountingRepository {
    pub fn new(inner: MemorySocialRepository) -> Self {
        Self {
            inner,
            user_lookups: AtomicUsize::new(0),
            post_queries: AtomicUsize::new(0),
            delete_post_before_comment: AtomicBool::new(false),
        }
    }

    pub fn reset(&self) {
        self.user_lookups.store(0, Ordering::SeqCst);
        self.post_queries.store(0, Ordering::SeqCst);
    }

    pub fn user_lookups(&self) -> usize {
        self.user_lookups.load(Ordering::SeqCst)
    }

    pub fn post_queries(&self) -> usize {
        self.post_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SocialRepository for CountingRepository {
    async fn insert_user(&self, user: NewUser, role: Role) -> ServiceResult<User> {
        self.inner.insert_user(user, role).await
    }

    async fn find_user_by_id(&self, user_id: i64) -> ServiceResult<Option<User>> {
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_user_by_id(user_id).await
    }

    async fn find_user_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_user_by_username(username).await
    }

    async fn username_exists(&self, username: &str) -> ServiceResult<bool> {
        self.inner.username_exists(username).await
    }

    async fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> ServiceResult<Option<User>> {
        self.inner.update_profile(user_id, update).await
    }

    async fn followed_ids(&self, user_id: i64) -> ServiceResult<Vec<i64>> {
        self.inner.followed_ids(user_id).await
    }

    async fn toggle_follow_edge(
        &self,
        follower_id: i64,
        following_id: i64,
    ) -> ServiceResult<EdgeChange> {
        self.inner.toggle_follow_edge(follower_id, following_id).await
    }

    async fn is_following(&self, follower_id: i64, following_id: i64) -> ServiceResult<bool> {
        self.inner.is_following(follower_id, following_id).await
    }

    async fn count_followers(&self, user_id: i64) -> ServiceResult<i64> {
        self.inner.count_followers(user_id).await
    }

    async fn count_following(&self, user_id: i64) -> ServiceResult<i64> {
        self.inner.count_following(user_id).await
    }

    async fn insert_post(&self, post: NewPost) -> ServiceResult<Post> {
        self.inner.insert_post(post).await
    }

    async fn find_post(&self, post_id: i64) -> ServiceResult<Option<FeedPost>> {
        self.inner.find_post(post_id).await
    }

    async fn count_posts_by_user(&self, user_id: i64) -> ServiceResult<i64> {
        self.inner.count_posts_by_user(user_id).await
    }

    async fn posts_by_authors(
        &self,
        author_ids: &[i64],
        after: Option<&FeedCursor>,
        limit: i64,
    ) -> ServiceResult<Vec<FeedPost>> {
        self.post_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.posts_by_authors(author_ids, after, limit).await
    }

    async fn posts_by_keyword(
        &self,
        keyword: &str,
        after: Option<&FeedCursor>,
        limit: i64,
    ) -> ServiceResult<Vec<FeedPost>> {
        self.post_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.posts_by_keyword(keyword, after, limit).await
    }

    async fn recent_posts(
        &self,
        after: Option<&FeedCursor>,
        limit: i64,
    ) -> ServiceResult<Vec<FeedPost>> {
        self.post_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.recent_posts(after, limit).await
    }

    async fn delete_post_cascade(&self, post_id: i64) -> ServiceResult<Option<u64>> {
        self.inner.delete_post_cascade(post_id).await
    }

    async fn insert_comment(&self, comment: NewComment) -> ServiceResult<Comment> {
        if self.delete_post_before_comment.swap(false, Ordering::SeqCst) {
            self.inner.delete_post_cascade(comment.post_id).await?;
        }
        self.inner.insert_comment(comment).await
    }

    async fn comments_for_post(&self, post_id: i64) -> ServiceResult<Vec<Comment>> {
        self.inner.comments_for_post(post_id).await
    }

    async fn find_comment(&self, comment_id: i64) -> ServiceResult<Option<Comment>> {
        self.inner.find_comment(comment_id).await
    }

    async fn delete_comment(&self, post_id: i64, comment_id: i64) -> ServiceResult<bool> {
        self.inner.delete_comment(post_id, comment_id).await
    }
}
