//! Feed assembly
//!
//! Merges posts of every followed author into one `(created_at DESC, id DESC)`
//! sequence and slices it with keyset cursors. The merge happens in storage
//! (one query over the author set, authors joined eagerly), so a page costs a
//! single round-trip regardless of how many users the viewer follows.
//!
//! Exactly-once delivery across pages holds for a static dataset. A post
//! inserted between two page fetches with a key behind the cursor is not
//! delivered on later pages.

use std::sync::Arc;
use tracing::debug;

use super::follow::FollowService;
use crate::config::FeedConfig;
use crate::domain::{FeedPost, Page, PageRequest};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::SocialRepository;

#[derive(Clone)]
pub struct FeedService {
    repo: Arc<dyn SocialRepository>,
    follows: FollowService,
    config: FeedConfig,
}

impl FeedService {
    pub fn new(repo: Arc<dyn SocialRepository>, config: FeedConfig) -> Self {
        Self {
            follows: FollowService::new(repo.clone()),
            repo,
            config,
        }
    }

    /// Home feed of `viewer_id`: posts by followed users, newest first.
    pub async fn get_feed(
        &self,
        viewer_id: i64,
        cursor: Option<&str>,
        page_size: Option<u32>,
    ) -> ServiceResult<Page<FeedPost>> {
        let request = PageRequest::parse(cursor, page_size, &self.config)?;

        if self.repo.find_user_by_id(viewer_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("user {viewer_id}")));
        }

        let mut authors = self.follows.following_ids_of(viewer_id).await?;
        if self.config.include_viewer_posts {
            authors.insert(viewer_id);
        }
        if authors.is_empty() {
            debug!(viewer_id, "Empty follow set, returning empty feed");
            return Ok(Page::empty());
        }

        let author_ids: Vec<i64> = authors.into_iter().collect();
        let rows = self
            .repo
            .posts_by_authors(&author_ids, request.after.as_ref(), request.fetch_limit())
            .await?;

        let page = Page::from_overfetch(rows, request.page_size);
        debug!(
            viewer_id,
            authors = author_ids.len(),
            returned = page.items.len(),
            has_more = page.has_more,
            "Assembled feed page"
        );
        Ok(page)
    }

    /// Global timeline across every author
    pub async fn get_recent(
        &self,
        cursor: Option<&str>,
        page_size: Option<u32>,
    ) -> ServiceResult<Page<FeedPost>> {
        let request = PageRequest::parse(cursor, page_size, &self.config)?;
        let rows = self
            .repo
            .recent_posts(request.after.as_ref(), request.fetch_limit())
            .await?;
        Ok(Page::from_overfetch(rows, request.page_size))
    }

    /// Posts of a single author
    pub async fn get_user_posts(
        &self,
        user_id: i64,
        cursor: Option<&str>,
        page_size: Option<u32>,
    ) -> ServiceResult<Page<FeedPost>> {
        let request = PageRequest::parse(cursor, page_size, &self.config)?;

        if self.repo.find_user_by_id(user_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("user {user_id}")));
        }

        let rows = self
            .repo
            .posts_by_authors(&[user_id], request.after.as_ref(), request.fetch_limit())
            .await?;
        Ok(Page::from_overfetch(rows, request.page_size))
    }
}
