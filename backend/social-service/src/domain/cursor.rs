//! Keyset pagination cursor
//!
//! A cursor pins the `(created_at, id)` sort key of the last row a caller has
//! seen. Pages are ordered by `created_at DESC, id DESC`, so the next page is
//! every row whose key compares strictly below the cursor.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};

use super::models::{storage_timestamp, FeedPost};
use crate::error::{ServiceError, ServiceResult};

/// Earliest instant PostgreSQL `timestamptz` can store (4713-11-24 BC), in
/// microseconds since the Unix epoch. Its upper limit (294276 AD) lies past
/// anything chrono represents.
const MIN_STORABLE_MICROS: i64 = -210_866_803_200_000_000;

/// Cursor format before encoding: "timestamp_micros:post_id"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedCursor {
    pub created_at: DateTime<Utc>,
    pub post_id: i64,
}

impl FeedCursor {
    pub fn new(created_at: DateTime<Utc>, post_id: i64) -> Self {
        Self {
            created_at: storage_timestamp(created_at),
            post_id,
        }
    }

    /// Cursor positioned on the given row
    pub fn after(post: &FeedPost) -> Self {
        Self::new(post.created_at, post.id)
    }

    /// Encode as an opaque URL-safe token
    pub fn encode(&self) -> String {
        let raw = format!("{}:{}", self.created_at.timestamp_micros(), self.post_id);
        general_purpose::URL_SAFE_NO_PAD.encode(raw)
    }

    /// Decode a token produced by [`FeedCursor::encode`]
    pub fn decode(token: &str) -> ServiceResult<Self> {
        let decoded = general_purpose::URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| ServiceError::BadRequest("Invalid cursor format".to_string()))?;
        let raw = String::from_utf8(decoded)
            .map_err(|_| ServiceError::BadRequest("Invalid cursor encoding".to_string()))?;

        let (ts_str, id_str) = raw
            .split_once(':')
            .ok_or_else(|| ServiceError::BadRequest("Invalid cursor format".to_string()))?;
        let micros = ts_str
            .parse::<i64>()
            .ok()
            .filter(|m| *m >= MIN_STORABLE_MICROS)
            .ok_or_else(|| ServiceError::BadRequest("Invalid cursor timestamp".to_string()))?;
        let created_at = DateTime::from_timestamp_micros(micros)
            .ok_or_else(|| ServiceError::BadRequest("Invalid cursor timestamp".to_string()))?;
        let post_id = id_str
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ServiceError::BadRequest("Invalid cursor post id".to_string()))?;

        Ok(Self {
            created_at,
            post_id,
        })
    }

    /// Decode an optional token; `None` or an empty string means first page
    pub fn decode_optional(token: Option<&str>) -> ServiceResult<Option<Self>> {
        match token {
            Some(token) if !token.is_empty() => Self::decode(token).map(Some),
            _ => Ok(None),
        }
    }

    /// True when a row with this key belongs on a page after the cursor
    pub fn admits(&self, created_at: DateTime<Utc>, post_id: i64) -> bool {
        (created_at, post_id) < (self.created_at, self.post_id)
    }
}
