use serde::{Deserialize, Serialize};

/// A feed post. Root-level content that can carry comments and likes.
///
/// `like_count` and `comment_count` are denormalized display counters.
/// They are only ever written in the same transaction as the Like or
/// Comment rows that justify them, so they never drift from the
/// underlying relations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,

    pub author_id: String,

    pub title: String,

    pub content: String,

    pub create_at: String,

    pub update_at: String,

    #[serde(default)]
    pub like_count: i64,

    #[serde(default)]
    pub comment_count: i64,
}

/// One page of the feed, newest posts first.
///
/// `next_cursor` is `None` on the last page; otherwise it is an opaque
/// token resuming the walk after the final post of this page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub posts: Vec<Post>,
    pub next_cursor: Option<String>,
}
