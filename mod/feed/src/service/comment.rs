use std::collections::HashMap;

use karmafeed_core::{ServiceError, new_id, now_rfc3339};
use karmafeed_sql::{Row, Value};

use super::{FeedService, storage_err};
use crate::model::Comment;

impl FeedService {
    /// Create a comment on a post, optionally as a reply.
    ///
    /// A reply's parent must exist and belong to the same post — a
    /// parent from another post can never be persisted. Depth is the
    /// parent's depth + 1 (0 for roots) and is capped by the
    /// `max_comment_depth` policy when one is configured.
    pub fn create_comment(
        &self,
        post_id: &str,
        author_id: &str,
        parent_id: Option<&str>,
        content: &str,
    ) -> Result<Comment, ServiceError> {
        self.get_user(author_id)?;
        self.get_post(post_id)?;

        if content.trim().is_empty() {
            return Err(ServiceError::Validation(
                "comment content must not be empty".into(),
            ));
        }

        let depth = match parent_id {
            None => 0,
            Some(pid) => {
                let parent = self.get_comment(pid)?;
                if parent.post_id != post_id {
                    return Err(ServiceError::Validation(format!(
                        "parent comment {} belongs to a different post",
                        pid
                    )));
                }
                parent.depth + 1
            }
        };
        if let Some(max) = self.config.max_comment_depth {
            if depth > max {
                return Err(ServiceError::Validation(format!(
                    "comment nesting deeper than {} is not allowed",
                    max
                )));
            }
        }

        let now = now_rfc3339();
        let comment = Comment {
            id: new_id(),
            post_id: post_id.to_string(),
            parent_id: parent_id.map(str::to_string),
            author_id: author_id.to_string(),
            content: content.to_string(),
            create_at: now.clone(),
            update_at: now,
            like_count: 0,
            depth,
        };
        let data = serde_json::to_string(&comment)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        // The comment row and the post's comment_count move together.
        self.sql
            .with_tx(&mut |tx| {
                tx.exec(
                    "INSERT INTO comments \
                     (id, data, post_id, parent_id, author_id, create_at, like_count, depth) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    &[
                        Value::Text(comment.id.clone()),
                        Value::Text(data.clone()),
                        Value::Text(comment.post_id.clone()),
                        match &comment.parent_id {
                            Some(p) => Value::Text(p.clone()),
                            None => Value::Null,
                        },
                        Value::Text(comment.author_id.clone()),
                        Value::Text(comment.create_at.clone()),
                        Value::Integer(0),
                        Value::Integer(comment.depth),
                    ],
                )?;
                tx.exec(
                    "UPDATE posts SET comment_count = comment_count + 1, \
                     data = json_set(data, '$.commentCount', \
                                     json_extract(data, '$.commentCount') + 1) \
                     WHERE id = ?1",
                    &[Value::Text(comment.post_id.clone())],
                )?;
                Ok(())
            })
            .map_err(storage_err)?;

        Ok(comment)
    }

    /// Get a comment by id.
    pub fn get_comment(&self, id: &str) -> Result<Comment, ServiceError> {
        self.get_record("comments", id)
    }

    /// Delete a comment and every descendant reply.
    ///
    /// The subtree is computed from the post's flat comment set inside
    /// the transaction, then removed along with its likes, and the
    /// post's comment_count drops by the number of rows removed — all
    /// in one commit.
    pub fn delete_comment(&self, id: &str) -> Result<(), ServiceError> {
        let comment = self.get_comment(id)?;

        self.sql
            .with_tx(&mut |tx| {
                let rows = tx.query(
                    "SELECT id, parent_id FROM comments WHERE post_id = ?1",
                    &[Value::Text(comment.post_id.clone())],
                )?;
                let doomed = subtree_ids(&comment.id, &rows);

                let placeholders = (1..=doomed.len())
                    .map(|i| format!("?{}", i))
                    .collect::<Vec<_>>()
                    .join(", ");
                let params: Vec<Value> =
                    doomed.iter().map(|d| Value::Text(d.clone())).collect();

                tx.exec(
                    &format!(
                        "DELETE FROM likes WHERE target_kind = 'comment' \
                         AND target_id IN ({placeholders})"
                    ),
                    &params,
                )?;
                tx.exec(
                    &format!("DELETE FROM comments WHERE id IN ({placeholders})"),
                    &params,
                )?;
                tx.exec(
                    "UPDATE posts SET comment_count = comment_count - ?1, \
                     data = json_set(data, '$.commentCount', \
                                     json_extract(data, '$.commentCount') - ?1) \
                     WHERE id = ?2",
                    &[
                        Value::Integer(doomed.len() as i64),
                        Value::Text(comment.post_id.clone()),
                    ],
                )?;
                Ok(())
            })
            .map_err(storage_err)
    }
}

/// Ids of `root` plus every comment whose parent chain includes it.
/// Explicit worklist, no recursion.
fn subtree_ids<'a>(root: &'a str, rows: &'a [Row]) -> Vec<String> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for row in rows {
        if let (Some(id), Some(parent)) = (row.get_str("id"), row.get_str("parent_id")) {
            children.entry(parent).or_default().push(id);
        }
    }

    let mut out = vec![root.to_string()];
    let mut stack = vec![root];
    while let Some(cur) = stack.pop() {
        if let Some(kids) = children.get(cur) {
            for &k in kids {
                out.push(k.to_string());
                stack.push(k);
            }
        }
    }
    out
}
