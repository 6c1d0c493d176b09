pub mod comment;
pub mod karma;
pub mod like;
pub mod post;
pub mod user;

pub use comment::{Comment, CommentAuthor, CommentNode, CommentView};
pub use karma::{KARMA_COMMENT_LIKE, KARMA_POST_LIKE, KarmaEvent, KarmaEventKind, LeaderboardEntry};
pub use like::{Like, LikeAction, LikeTarget, LikeToggle};
pub use post::{FeedPage, Post};
pub use user::User;
