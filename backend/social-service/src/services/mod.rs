pub mod feed;
pub mod follow;
pub mod posts;
pub mod search;
pub mod users;

pub use feed::FeedService;
pub use follow::FollowService;
pub use posts::PostService;
pub use search::SearchService;
pub use users::UserService;

use std::sync::Arc;

use crate::config::FeedConfig;
use crate::repository::SocialRepository;

/// Every service wired against one shared repository
#[derive(Clone)]
pub struct SocialServices {
    pub users: UserService,
    pub follows: FollowService,
    pub posts: PostService,
    pub feed: FeedService,
    pub search: SearchService,
}

impl SocialServices {
    pub fn new(repo: Arc<dyn SocialRepository>, feed_config: FeedConfig) -> Self {
        Self {
            users: UserService::new(repo.clone()),
            follows: FollowService::new(repo.clone()),
            posts: PostService::new(repo.clone()),
            feed: FeedService::new(repo.clone(), feed_config),
            search: SearchService::new(repo, feed_config),
        }
    }
}
