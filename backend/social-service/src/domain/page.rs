use serde::{Deserialize, Serialize};

use super::cursor::FeedCursor;
use super::models::FeedPost;
use crate::config::FeedConfig;
use crate::error::{ServiceError, ServiceResult};

/// Validated page request: decoded cursor plus an effective page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub after: Option<FeedCursor>,
    pub page_size: u32,
}

impl PageRequest {
    /// Validate caller input against the configured limits.
    ///
    /// `None` page size falls back to the default, zero is rejected, and
    /// anything above the maximum is capped.
    pub fn parse(
        cursor: Option<&str>,
        page_size: Option<u32>,
        config: &FeedConfig,
    ) -> ServiceResult<Self> {
        let page_size = match page_size {
            None => config.default_page_size,
            Some(0) => {
                return Err(ServiceError::BadRequest(
                    "page_size must be a positive integer".to_string(),
                ))
            }
            Some(n) => n.min(config.max_page_size),
        };
        let after = FeedCursor::decode_optional(cursor)?;
        Ok(Self { after, page_size })
    }

    /// Rows to ask storage for: one extra to learn whether another page exists
    pub fn fetch_limit(&self) -> i64 {
        i64::from(self.page_size) + 1
    }
}

/// Bounded slice of an ordered result set plus a continuation token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            has_more: false,
        }
    }
}

impl Page<FeedPost> {
    /// Build a page from `page_size + 1` over-fetched rows
    pub fn from_overfetch(mut rows: Vec<FeedPost>, page_size: u32) -> Self {
        let page_size = page_size as usize;
        let has_more = rows.len() > page_size;
        rows.truncate(page_size);

        let next_cursor = if has_more {
            rows.last().map(|last| FeedCursor::after(last).encode())
        } else {
            None
        };

        Self {
            items: rows,
            next_cursor,
            has_more,
        }
    }
}
