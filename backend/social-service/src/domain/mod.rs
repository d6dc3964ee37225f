pub mod cursor;
pub mod models;
pub mod page;

pub use cursor::FeedCursor;
pub use models::{
    Comment, EdgeChange, FeedPost, Follow, FollowState, NewComment, NewPost, NewUser, Post,
    Profile, ProfileUpdate, Role, User,
};
pub use page::{Page, PageRequest};
