//! In-process social store
//!
//! Mirrors the PostgreSQL repository's semantics (unique usernames, unique
//! follow pairs, keyset ordering, comment cascade) behind a single
//! `tokio::sync::RwLock`. Used by the test suite and for embedding the
//! services without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;
use tracing::debug;

use super::SocialRepository;
use crate::domain::models::storage_timestamp;
use crate::domain::{
    Comment, EdgeChange, FeedCursor, FeedPost, NewComment, NewPost, NewUser, Post, ProfileUpdate,
    Role, User,
};
use crate::error::{ServiceError, ServiceResult};

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    follows: BTreeMap<(i64, i64), DateTime<Utc>>,
    next_user_id: i64,
    next_post_id: i64,
    next_comment_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl MemoryState {
    fn now() -> DateTime<Utc> {
        storage_timestamp(Utc::now())
    }

    fn require_user(&self, user_id: i64, column: &str) -> ServiceResult<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(ServiceError::Internal(format!(
                "foreign key violation: {column} references missing user {user_id}"
            )))
        }
    }

    fn feed_post(&self, post: &Post) -> Option<FeedPost> {
        self.users
            .get(&post.user_id)
            .map(|author| FeedPost::from_post(post, author))
    }

    /// Keyset scan in `(created_at DESC, id DESC)` order
    fn scan<F>(&self, filter: F, after: Option<&FeedCursor>, limit: i64) -> Vec<FeedPost>
    where
        F: Fn(&Post) -> bool,
    {
        let mut rows: Vec<&Post> = self
            .posts
            .values()
            .filter(|p| filter(p))
            .filter(|p| after.map_or(true, |c| c.admits(p.created_at, p.id)))
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        rows.into_iter()
            .take(usize::try_from(limit).unwrap_or(0))
            .filter_map(|p| self.feed_post(p))
            .collect()
    }
}

/// Embedded repository with the same contract as PostgreSQL
#[derive(Default)]
pub struct MemorySocialRepository {
    state: RwLock<MemoryState>,
}

impl MemorySocialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a user with a fixed id (fixtures and backfills)
    pub async fn seed_user(&self, mut user: User) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.id)
            || state.users.values().any(|u| u.username == user.username)
        {
            return Err(ServiceError::Conflict(format!(
                "user {} ({}) already exists",
                user.id, user.username
            )));
        }
        user.created_at = storage_timestamp(user.created_at);
        user.updated_at = storage_timestamp(user.updated_at);
        state.next_user_id = state.next_user_id.max(user.id);
        state.users.insert(user.id, user);
        Ok(())
    }

    /// Load a post with a fixed id and timestamp (fixtures and backfills)
    pub async fn seed_post(&self, mut post: Post) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        state.require_user(post.user_id, "posts.user_id")?;
        if state.posts.contains_key(&post.id) {
            return Err(ServiceError::Conflict(format!("post {} already exists", post.id)));
        }
        post.created_at = storage_timestamp(post.created_at);
        post.updated_at = storage_timestamp(post.updated_at);
        state.next_post_id = state.next_post_id.max(post.id);
        state.posts.insert(post.id, post);
        Ok(())
    }

    /// Number of follow edges stored for an ordered pair (0 or 1)
    pub async fn edge_count(&self, follower_id: i64, following_id: i64) -> usize {
        let state = self.state.read().await;
        usize::from(state.follows.contains_key(&(follower_id, following_id)))
    }

    /// Total number of stored comments, across all posts
    pub async fn comment_count(&self) -> usize {
        self.state.read().await.comments.len()
    }
}

#[async_trait]
impl SocialRepository for MemorySocialRepository {
    async fn insert_user(&self, user: NewUser, role: Role) -> ServiceResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(ServiceError::Conflict(format!(
                "username '{}' is already taken",
                user.username
            )));
        }

        let now = MemoryState::now();
        let created = User {
            id: next_id(&mut state.next_user_id),
            username: user.username,
            name: user.name,
            password_hash: user.password_hash,
            email: user.email,
            role,
            bio: user.bio,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user_by_id(&self, user_id: i64) -> ServiceResult<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn username_exists(&self, username: &str) -> ServiceResult<bool> {
        let state = self.state.read().await;
        Ok(state.users.values().any(|u| u.username == username))
    }

    async fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> ServiceResult<Option<User>> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(None);
        };
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(bio) = update.bio {
            user.bio = bio;
        }
        user.updated_at = MemoryState::now();
        Ok(Some(user.clone()))
    }

    async fn followed_ids(&self, user_id: i64) -> ServiceResult<Vec<i64>> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .range((user_id, i64::MIN)..=(user_id, i64::MAX))
            .map(|((_, following_id), _)| *following_id)
            .collect())
    }

    async fn toggle_follow_edge(
        &self,
        follower_id: i64,
        following_id: i64,
    ) -> ServiceResult<EdgeChange> {
        let mut state = self.state.write().await;
        let change = if state.follows.remove(&(follower_id, following_id)).is_some() {
            EdgeChange::Deleted
        } else {
            state.require_user(follower_id, "follows.follower_id")?;
            state.require_user(following_id, "follows.following_id")?;
            state
                .follows
                .insert((follower_id, following_id), MemoryState::now());
            EdgeChange::Created
        };

        debug!(follower_id, following_id, ?change, "Toggled follow edge in memory");
        Ok(change)
    }

    async fn is_following(&self, follower_id: i64, following_id: i64) -> ServiceResult<bool> {
        let state = self.state.read().await;
        Ok(state.follows.contains_key(&(follower_id, following_id)))
    }

    async fn count_followers(&self, user_id: i64) -> ServiceResult<i64> {
        let state = self.state.read().await;
        Ok(state.follows.keys().filter(|(_, to)| *to == user_id).count() as i64)
    }

    async fn count_following(&self, user_id: i64) -> ServiceResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .range((user_id, i64::MIN)..=(user_id, i64::MAX))
            .count() as i64)
    }

    async fn insert_post(&self, post: NewPost) -> ServiceResult<Post> {
        let mut state = self.state.write().await;
        state.require_user(post.user_id, "posts.user_id")?;

        let now = MemoryState::now();
        let created = Post {
            id: next_id(&mut state.next_post_id),
            user_id: post.user_id,
            content: post.content,
            image_url: post.image_url,
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_post(&self, post_id: i64) -> ServiceResult<Option<FeedPost>> {
        let state = self.state.read().await;
        Ok(state.posts.get(&post_id).and_then(|p| state.feed_post(p)))
    }

    async fn count_posts_by_user(&self, user_id: i64) -> ServiceResult<i64> {
        let state = self.state.read().await;
        Ok(state.posts.values().filter(|p| p.user_id == user_id).count() as i64)
    }

    async fn posts_by_authors(
        &self,
        author_ids: &[i64],
        after: Option<&FeedCursor>,
        limit: i64,
    ) -> ServiceResult<Vec<FeedPost>> {
        let authors: BTreeSet<i64> = author_ids.iter().copied().collect();
        let state = self.state.read().await;
        Ok(state.scan(|p| authors.contains(&p.user_id), after, limit))
    }

    async fn posts_by_keyword(
        &self,
        keyword: &str,
        after: Option<&FeedCursor>,
        limit: i64,
    ) -> ServiceResult<Vec<FeedPost>> {
        let state = self.state.read().await;
        Ok(state.scan(|p| p.content.contains(keyword), after, limit))
    }

    async fn recent_posts(
        &self,
        after: Option<&FeedCursor>,
        limit: i64,
    ) -> ServiceResult<Vec<FeedPost>> {
        let state = self.state.read().await;
        Ok(state.scan(|_| true, after, limit))
    }

    async fn delete_post_cascade(&self, post_id: i64) -> ServiceResult<Option<u64>> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post_id) {
            return Ok(None);
        }

        let before = state.comments.len();
        state.comments.retain(|_, c| c.post_id != post_id);
        let comments_removed = (before - state.comments.len()) as u64;
        state.posts.remove(&post_id);

        Ok(Some(comments_removed))
    }

    async fn insert_comment(&self, comment: NewComment) -> ServiceResult<Comment> {
        let mut state = self.state.write().await;
        state.require_user(comment.user_id, "comments.user_id")?;
        if !state.posts.contains_key(&comment.post_id) {
            return Err(ServiceError::NotFound(format!("post {}", comment.post_id)));
        }

        let created = Comment {
            id: next_id(&mut state.next_comment_id),
            post_id: comment.post_id,
            user_id: comment.user_id,
            content: comment.content,
            created_at: MemoryState::now(),
        };
        state.comments.insert(created.id, created.clone());
        Ok(created)
    }

    async fn comments_for_post(&self, post_id: i64) -> ServiceResult<Vec<Comment>> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(comments)
    }

    async fn find_comment(&self, comment_id: i64) -> ServiceResult<Option<Comment>> {
        Ok(self.state.read().await.comments.get(&comment_id).cloned())
    }

    async fn delete_comment(&self, post_id: i64, comment_id: i64) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        let owned = state
            .comments
            .get(&comment_id)
            .map_or(false, |c| c.post_id == post_id);
        if owned {
            state.comments.remove(&comment_id);
        }
        Ok(owned)
    }
}
