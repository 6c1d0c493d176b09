use serde::{Deserialize, Serialize};

/// A threaded comment, stored flat with a parent reference
/// (adjacency list). Trees are assembled in memory from one fetch;
/// nothing in storage is ever walked recursively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,

    pub post_id: String,

    /// `None` for a root comment. A non-null parent always references a
    /// comment of the same post; that is checked at creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    pub author_id: String,

    pub content: String,

    pub create_at: String,

    pub update_at: String,

    #[serde(default)]
    pub like_count: i64,

    /// Cached nesting level: 0 for roots, parent depth + 1 otherwise.
    /// A convenience for rendering; the parent chain stays authoritative.
    #[serde(default)]
    pub depth: i64,
}

/// Author display data carried alongside each comment in a thread.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub id: String,
    pub username: String,
}

/// A comment paired with its author, ready for tree assembly.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub post_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub author: CommentAuthor,
    pub content: String,
    pub create_at: String,
    pub like_count: i64,
    pub depth: i64,
}

impl CommentView {
    pub fn new(comment: Comment, username: String) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            author: CommentAuthor {
                id: comment.author_id,
                username,
            },
            content: comment.content,
            create_at: comment.create_at,
            like_count: comment.like_count,
            depth: comment.depth,
        }
    }
}

/// One node of an assembled comment thread. Replies keep the order of
/// the input (creation time ascending).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub comment: CommentView,
    pub replies: Vec<CommentNode>,
}
