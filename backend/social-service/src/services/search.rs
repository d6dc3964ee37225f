use std::sync::Arc;
use tracing::debug;

use crate::config::FeedConfig;
use crate::domain::{FeedPost, Page, PageRequest};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::SocialRepository;

/// Keyword search over post content with the feed's pagination contract
#[derive(Clone)]
pub struct SearchService {
    repo: Arc<dyn SocialRepository>,
    config: FeedConfig,
}

impl SearchService {
    pub fn new(repo: Arc<dyn SocialRepository>, config: FeedConfig) -> Self {
        Self { repo, config }
    }

    /// Posts whose content contains `keyword` (case-sensitive, literal), newest first.
    pub async fn search(
        &self,
        keyword: &str,
        cursor: Option<&str>,
        page_size: Option<u32>,
    ) -> ServiceResult<Page<FeedPost>> {
        if keyword.is_empty() {
            return Err(ServiceError::BadRequest("keyword must not be empty".to_string()));
        }
        let request = PageRequest::parse(cursor, page_size, &self.config)?;

        let rows = self
            .repo
            .posts_by_keyword(keyword, request.after.as_ref(), request.fetch_limit())
            .await?;

        let page = Page::from_overfetch(rows, request.page_size);
        debug!(
            keyword,
            returned = page.items.len(),
            has_more = page.has_more,
            "Assembled search page"
        );
        Ok(page)
    }
}
