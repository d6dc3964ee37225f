use async_trait::async_trait;

use crate::domain::{
    Comment, EdgeChange, FeedCursor, FeedPost, NewComment, NewPost, NewUser, Post, ProfileUpdate,
    Role, User,
};
use crate::error::ServiceResult;

/// Storage operations used by the social services.
/// Both PostgresSocialRepository and MemorySocialRepository implement this.
///
/// Every post listing returns rows ordered by `(created_at DESC, id DESC)`,
/// restricted to rows strictly after `after` when a cursor is given.
#[async_trait]
pub trait SocialRepository: Send + Sync {
    // ---- users ----

    /// Insert a user with an explicit role (`NewUser::role` is ignored here)
    async fn insert_user(&self, user: NewUser, role: Role) -> ServiceResult<User>;

    async fn find_user_by_id(&self, user_id: i64) -> ServiceResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> ServiceResult<Option<User>>;

    async fn username_exists(&self, username: &str) -> ServiceResult<bool>;

    /// Apply a partial profile update; `None` when the user does not exist
    async fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> ServiceResult<Option<User>>;

    // ---- follows ----

    /// Ids of users that `user_id` follows
    async fn followed_ids(&self, user_id: i64) -> ServiceResult<Vec<i64>>;

    /// Atomically delete the edge if present, otherwise create it
    async fn toggle_follow_edge(
        &self,
        follower_id: i64,
        following_id: i64,
    ) -> ServiceResult<EdgeChange>;

    async fn is_following(&self, follower_id: i64, following_id: i64) -> ServiceResult<bool>;

    /// Number of users following `user_id`
    async fn count_followers(&self, user_id: i64) -> ServiceResult<i64>;

    /// Number of users `user_id` follows
    async fn count_following(&self, user_id: i64) -> ServiceResult<i64>;

    // ---- posts ----

    async fn insert_post(&self, post: NewPost) -> ServiceResult<Post>;

    async fn find_post(&self, post_id: i64) -> ServiceResult<Option<FeedPost>>;

    async fn count_posts_by_user(&self, user_id: i64) -> ServiceResult<i64>;

    async fn posts_by_authors(
        &self,
        author_ids: &[i64],
        after: Option<&FeedCursor>,
        limit: i64,
    ) -> ServiceResult<Vec<FeedPost>>;

    /// Case-sensitive substring match on post content
    async fn posts_by_keyword(
        &self,
        keyword: &str,
        after: Option<&FeedCursor>,
        limit: i64,
    ) -> ServiceResult<Vec<FeedPost>>;

    async fn recent_posts(
        &self,
        after: Option<&FeedCursor>,
        limit: i64,
    ) -> ServiceResult<Vec<FeedPost>>;

    /// Delete a post and every comment it owns in one transaction.
    /// Returns the number of comments removed, or `None` if the post was absent.
    async fn delete_post_cascade(&self, post_id: i64) -> ServiceResult<Option<u64>>;

    // ---- comments ----

    async fn insert_comment(&self, comment: NewComment) -> ServiceResult<Comment>;

    /// Comments of a post ordered by `(created_at ASC, id ASC)`
    async fn comments_for_post(&self, post_id: i64) -> ServiceResult<Vec<Comment>>;

    async fn find_comment(&self, comment_id: i64) -> ServiceResult<Option<Comment>>;

    /// Remove a comment from its post; returns true if a row was deleted
    async fn delete_comment(&self, post_id: i64, comment_id: i64) -> ServiceResult<bool>;

    /// Health check (optional)
    async fn health_check(&self) -> ServiceResult<()> {
        Ok(())
    }
}
