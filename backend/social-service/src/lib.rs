pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod repository;
pub mod services;

pub use config::{Config, FeedConfig};
pub use domain::{FeedCursor, FeedPost, FollowState, Page};
pub use error::{ServiceError, ServiceResult};
pub use repository::{MemorySocialRepository, PostgresSocialRepository, SocialRepository};
pub use services::SocialServices;
