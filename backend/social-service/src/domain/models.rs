use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a username
pub const USERNAME_MAX_LEN: usize = 30;
/// Maximum length of post and comment bodies
pub const CONTENT_MAX_LEN: usize = 1000;

/// Storage precision for every timestamp (PostgreSQL timestamptz is microseconds)
pub fn storage_timestamp(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Display name, free text
    pub name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub role: Role,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration input; the credential arrives already hashed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub email: String,
    pub bio: String,
    /// Falls back to [`Role::User`] at registration
    pub role: Option<Role>,
}

/// Partial update of the mutable profile fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.bio.is_none()
    }
}

/// Public profile with social statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub name: Option<String>,
    pub bio: String,
    pub post_count: i64,
    /// Users following this profile
    pub follower_count: i64,
    /// Users this profile follows
    pub following_count: i64,
}

/// Post entity - `user_id` is fixed at creation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub user_id: i64,
    pub content: String,
    pub image_url: Option<String>,
}

/// Post joined with its author, as returned by feed and search pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FeedPost {
    pub id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FeedPost {
    pub fn from_post(post: &Post, author: &User) -> Self {
        Self {
            id: post.id,
            author_id: author.id,
            author_username: author.username.clone(),
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            created_at: post.created_at,
        }
    }
}

/// Comment entity - exclusively owned by its post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
}

/// Directed follow edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub follower_id: i64,
    pub following_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a follow toggle at the storage level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeChange {
    Created,
    Deleted,
}

/// Relationship state after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowState {
    Following,
    NotFollowing,
}

impl From<EdgeChange> for FollowState {
    fn from(change: EdgeChange) -> Self {
        match change {
            EdgeChange::Created => FollowState::Following,
            EdgeChange::Deleted => FollowState::NotFollowing,
        }
    }
}
