use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::models::CONTENT_MAX_LEN;
use crate::domain::{Comment, FeedPost, NewComment, NewPost};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::SocialRepository;

fn validate_content(field: &str, content: &str) -> ServiceResult<()> {
    if content.trim().is_empty() {
        return Err(ServiceError::BadRequest(format!("{field} must not be empty")));
    }
    if content.chars().count() > CONTENT_MAX_LEN {
        return Err(ServiceError::BadRequest(format!(
            "{field} exceeds {CONTENT_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Posts and the comments they own
#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn SocialRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn SocialRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_post(
        &self,
        author_id: i64,
        content: &str,
        image_url: Option<&str>,
    ) -> ServiceResult<FeedPost> {
        validate_content("content", content)?;
        let author = self
            .repo
            .find_user_by_id(author_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {author_id}")))?;

        let post = self
            .repo
            .insert_post(NewPost {
                user_id: author.id,
                content: content.to_string(),
                image_url: image_url.map(str::to_string),
            })
            .await?;

        debug!(post_id = post.id, author_id, "Created post");
        Ok(FeedPost::from_post(&post, &author))
    }

    pub async fn get_post(&self, post_id: i64) -> ServiceResult<FeedPost> {
        self.repo
            .find_post(post_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("post {post_id}")))
    }

    /// Delete a post together with all of its comments. Only the author may delete.
    pub async fn delete_post(&self, post_id: i64, requester_id: i64) -> ServiceResult<()> {
        let post = self.get_post(post_id).await?;
        if post.author_id != requester_id {
            return Err(ServiceError::Forbidden(format!(
                "user {requester_id} cannot delete post {post_id}"
            )));
        }

        match self.repo.delete_post_cascade(post_id).await? {
            Some(comments_removed) => {
                info!(post_id, comments_removed, "Deleted post");
                Ok(())
            }
            // Lost a race with another delete of the same post
            None => Err(ServiceError::NotFound(format!("post {post_id}"))),
        }
    }

    pub async fn add_comment(
        &self,
        post_id: i64,
        author_id: i64,
        content: &str,
    ) -> ServiceResult<Comment> {
        validate_content("comment", content)?;
        self.get_post(post_id).await?;
        if self.repo.find_user_by_id(author_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("user {author_id}")));
        }

        let comment = self
            .repo
            .insert_comment(NewComment {
                post_id,
                user_id: author_id,
                content: content.to_string(),
            })
            .await
            .map_err(|err| {
                if err.is_foreign_key_violation() {
                    // post deleted after the existence check
                    warn!(post_id, author_id, "Post removed before comment insert");
                    ServiceError::NotFound(format!("post {post_id}"))
                } else {
                    err
                }
            })?;

        debug!(comment_id = comment.id, post_id, author_id, "Added comment");
        Ok(comment)
    }

    /// Comments of a post, oldest first
    pub async fn list_comments(&self, post_id: i64) -> ServiceResult<Vec<Comment>> {
        self.get_post(post_id).await?;
        self.repo.comments_for_post(post_id).await
    }

    /// Detach a comment from its post, which deletes it.
    /// Allowed for the comment author and the post author.
    pub async fn remove_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        requester_id: i64,
    ) -> ServiceResult<()> {
        let post = self.get_post(post_id).await?;
        let comment = self
            .repo
            .find_comment(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("comment {comment_id} on post {post_id}"))
            })?;

        if comment.user_id != requester_id && post.author_id != requester_id {
            return Err(ServiceError::Forbidden(format!(
                "user {requester_id} cannot remove comment {comment_id}"
            )));
        }

        if !self.repo.delete_comment(post_id, comment_id).await? {
            return Err(ServiceError::NotFound(format!(
                "comment {comment_id} on post {post_id}"
            )));
        }

        debug!(comment_id, post_id, "Removed comment");
        Ok(())
    }
}
