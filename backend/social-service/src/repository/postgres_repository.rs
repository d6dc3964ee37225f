use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use super::SocialRepository;
use crate::domain::{
    Comment, EdgeChange, FeedCursor, FeedPost, NewComment, NewPost, NewUser, Post, ProfileUpdate,
    Role, User,
};
use crate::error::ServiceResult;

const USER_COLUMNS: &str =
    "id, username, name, password_hash, email, role, bio, created_at, updated_at";

/// Build a keyset-paginated post listing joined with the author.
///
/// `$1`/`$2` carry the cursor (both NULL on the first page), `$3` the limit,
/// and `filter` may reference `$4`.
fn feed_query(filter: &str) -> String {
    format!(
        r#"
        SELECT p.id, p.user_id AS author_id, u.username AS author_username,
               p.content, p.image_url, p.created_at
        FROM posts p
        JOIN users u ON u.id = p.user_id
        WHERE {filter}
          AND ($1::timestamptz IS NULL OR (p.created_at, p.id) < ($1::timestamptz, $2::bigint))
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT $3
        "#
    )
}

fn cursor_binds(after: Option<&FeedCursor>) -> (Option<DateTime<Utc>>, Option<i64>) {
    match after {
        Some(cursor) => (Some(cursor.created_at), Some(cursor.post_id)),
        None => (None, None),
    }
}

/// PostgreSQL repository (source of truth)
#[derive(Clone)]
pub struct PostgresSocialRepository {
    pool: PgPool,
}

impl PostgresSocialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SocialRepository for PostgresSocialRepository {
    async fn insert_user(&self, user: NewUser, role: Role) -> ServiceResult<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, name, password_hash, email, role, bio)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(role)
        .bind(&user.bio)
        .fetch_one(&self.pool)
        .await?;

        debug!(user_id = created.id, username = %created.username, "Inserted user");
        Ok(created)
    }

    async fn find_user_by_id(&self, user_id: i64) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn username_exists(&self, username: &str) -> ServiceResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                bio = COALESCE($3, bio),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(update.email)
        .bind(update.bio)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn followed_ids(&self, user_id: i64) -> ServiceResult<Vec<i64>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT following_id FROM follows WHERE follower_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids)
    }

    async fn toggle_follow_edge(
        &self,
        follower_id: i64,
        following_id: i64,
    ) -> ServiceResult<EdgeChange> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            "DELETE FROM follows WHERE follower_id = $1 AND following_id = $2",
        )
        .bind(follower_id)
        .bind(following_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let change = if removed > 0 {
            EdgeChange::Deleted
        } else {
            let inserted: Option<i64> = sqlx::query_scalar(
                r#"
                INSERT INTO follows (follower_id, following_id, created_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (follower_id, following_id) DO NOTHING
                RETURNING follower_id
                "#,
            )
            .bind(follower_id)
            .bind(following_id)
            .fetch_optional(&mut *tx)
            .await?;

            if inserted.is_none() {
                // A concurrent toggle created the same edge first; the pair is followed either way.
                debug!(follower_id, following_id, "Follow edge already present, no-op");
            }
            EdgeChange::Created
        };

        tx.commit().await?;

        debug!(follower_id, following_id, ?change, "Toggled follow edge in PostgreSQL");
        Ok(change)
    }

    async fn is_following(&self, follower_id: i64, following_id: i64) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND following_id = $2)",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_followers(&self, user_id: i64) -> ServiceResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE following_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn count_following(&self, user_id: i64) -> ServiceResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE follower_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn insert_post(&self, post: NewPost) -> ServiceResult<Post> {
        let created = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (user_id, content, image_url)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, content, image_url, created_at, updated_at
            "#,
        )
        .bind(post.user_id)
        .bind(&post.content)
        .bind(&post.image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_post(&self, post_id: i64) -> ServiceResult<Option<FeedPost>> {
        let post = sqlx::query_as::<_, FeedPost>(
            r#"
            SELECT p.id, p.user_id AS author_id, u.username AS author_username,
                   p.content, p.image_url, p.created_at
            FROM posts p
            JOIN users u ON u.id = p.user_id
            WHERE p.id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn count_posts_by_user(&self, user_id: i64) -> ServiceResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn posts_by_authors(
        &self,
        author_ids: &[i64],
        after: Option<&FeedCursor>,
        limit: i64,
    ) -> ServiceResult<Vec<FeedPost>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let (ts, id) = cursor_binds(after);
        let posts = sqlx::query_as::<_, FeedPost>(&feed_query("p.user_id = ANY($4)"))
            .bind(ts)
            .bind(id)
            .bind(limit)
            .bind(author_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }

    async fn posts_by_keyword(
        &self,
        keyword: &str,
        after: Option<&FeedCursor>,
        limit: i64,
    ) -> ServiceResult<Vec<FeedPost>> {
        // strpos keeps the match literal: no LIKE wildcards, case-sensitive
        let (ts, id) = cursor_binds(after);
        let posts = sqlx::query_as::<_, FeedPost>(&feed_query("strpos(p.content, $4) > 0"))
            .bind(ts)
            .bind(id)
            .bind(limit)
            .bind(keyword)
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }

    async fn recent_posts(
        &self,
        after: Option<&FeedCursor>,
        limit: i64,
    ) -> ServiceResult<Vec<FeedPost>> {
        let (ts, id) = cursor_binds(after);
        let posts = sqlx::query_as::<_, FeedPost>(&feed_query("TRUE"))
            .bind(ts)
            .bind(id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }

    async fn delete_post_cascade(&self, post_id: i64) -> ServiceResult<Option<u64>> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let comments_removed = sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(post_id, comments_removed, "Deleted post and its comments in PostgreSQL");
        Ok(Some(comments_removed))
    }

    async fn insert_comment(&self, comment: NewComment) -> ServiceResult<Comment> {
        let created = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, user_id, content, created_at
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.user_id)
        .bind(&comment.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn comments_for_post(&self, post_id: i64) -> ServiceResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, content, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn find_comment(&self, comment_id: i64) -> ServiceResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, user_id, content, created_at FROM comments WHERE id = $1",
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn delete_comment(&self, post_id: i64, comment_id: i64) -> ServiceResult<bool> {
        let affected = sqlx::query("DELETE FROM comments WHERE id = $1 AND post_id = $2")
            .bind(comment_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    async fn health_check(&self) -> ServiceResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
