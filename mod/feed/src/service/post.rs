use karmafeed_core::{ServiceError, merge_patch, new_id, now_rfc3339};
use karmafeed_sql::Value;

use super::{FeedService, cursor, rows_to_records, storage_err};
use crate::model::{FeedPage, Post};

impl FeedService {
    /// Create a new post.
    pub fn create_post(
        &self,
        author_id: &str,
        title: &str,
        content: &str,
    ) -> Result<Post, ServiceError> {
        self.get_user(author_id)?;

        let title = title.trim();
        if title.len() < 3 {
            return Err(ServiceError::Validation(
                "title must be at least 3 characters".into(),
            ));
        }
        if content.trim().len() < 10 {
            return Err(ServiceError::Validation(
                "content must be at least 10 characters".into(),
            ));
        }

        let now = now_rfc3339();
        let post = Post {
            id: new_id(),
            author_id: author_id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            create_at: now.clone(),
            update_at: now.clone(),
            like_count: 0,
            comment_count: 0,
        };

        self.insert_record(
            "posts",
            &post.id,
            &post,
            &[
                ("author_id", Value::Text(post.author_id.clone())),
                ("create_at", Value::Text(now.clone())),
                ("update_at", Value::Text(now)),
                ("like_count", Value::Integer(0)),
                ("comment_count", Value::Integer(0)),
            ],
        )?;

        Ok(post)
    }

    /// Get a post by id.
    pub fn get_post(&self, id: &str) -> Result<Post, ServiceError> {
        self.get_record("posts", id)
    }

    /// Update a post with JSON merge-patch semantics.
    ///
    /// Identity, authorship, and the denormalized counters are not
    /// patchable; `update_at` is always stamped by the server.
    pub fn update_post(&self, id: &str, patch: serde_json::Value) -> Result<Post, ServiceError> {
        let current = self.get_post(id)?;
        let now = now_rfc3339();

        let mut base = serde_json::to_value(&current)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut patch = patch;
        if let Some(obj) = patch.as_object_mut() {
            obj.remove("id");
            obj.remove("authorId");
            obj.remove("createAt");
            obj.remove("likeCount");
            obj.remove("commentCount");
            obj.insert("updateAt".into(), serde_json::json!(now));
        }
        merge_patch(&mut base, &patch);

        let updated: Post =
            serde_json::from_value(base).map_err(|e| ServiceError::Internal(e.to_string()))?;

        if updated.title.trim().len() < 3 || updated.content.trim().len() < 10 {
            return Err(ServiceError::Validation(
                "patched post fails length validation".into(),
            ));
        }

        self.update_record(
            "posts",
            id,
            &updated,
            &[("update_at", Value::Text(updated.update_at.clone()))],
        )?;

        Ok(updated)
    }

    /// Delete a post and everything hanging off it.
    ///
    /// The cascade is explicit and shares one transaction: comments,
    /// likes on the post, likes on its comments. Nothing reacts to the
    /// deletes after the fact — there is no half-deleted state for a
    /// hook to observe. Karma events are the one exception: the ledger
    /// is append-only and keeps its history.
    pub fn delete_post(&self, id: &str) -> Result<(), ServiceError> {
        self.get_post(id)?;
        let post_id = Value::Text(id.to_string());

        self.sql
            .with_tx(&mut |tx| {
                tx.exec(
                    "DELETE FROM likes WHERE target_kind = 'comment' AND target_id IN \
                     (SELECT id FROM comments WHERE post_id = ?1)",
                    &[post_id.clone()],
                )?;
                tx.exec(
                    "DELETE FROM likes WHERE target_kind = 'post' AND target_id = ?1",
                    &[post_id.clone()],
                )?;
                tx.exec("DELETE FROM comments WHERE post_id = ?1", &[post_id.clone()])?;
                tx.exec("DELETE FROM posts WHERE id = ?1", &[post_id.clone()])?;
                Ok(())
            })
            .map_err(storage_err)
    }

    /// One page of the feed, newest first.
    ///
    /// The cursor pins a position in the (create_at DESC, id DESC) total
    /// order, so a resumed walk neither skips nor repeats posts while
    /// the feed is append-only. Posts created after the walk began may
    /// or may not appear, depending on where they land relative to the
    /// cursor; that is the documented contract, not a snapshot.
    pub fn feed_page(
        &self,
        cursor: Option<&str>,
        limit: Option<usize>,
    ) -> Result<FeedPage, ServiceError> {
        let limit = limit.unwrap_or(self.config.default_page_size).clamp(1, 100);

        // Fetch one row beyond the page to learn whether another page exists.
        let fetch = Value::Integer(limit as i64 + 1);
        let rows = match cursor {
            None => self
                .sql
                .query(
                    "SELECT data FROM posts ORDER BY create_at DESC, id DESC LIMIT ?1",
                    &[fetch],
                )
                .map_err(storage_err)?,
            Some(token) => {
                let (create_at, id) = cursor::decode(token)?;
                self.sql
                    .query(
                        "SELECT data FROM posts \
                         WHERE create_at < ?1 OR (create_at = ?1 AND id < ?2) \
                         ORDER BY create_at DESC, id DESC LIMIT ?3",
                        &[Value::Text(create_at), Value::Text(id), fetch],
                    )
                    .map_err(storage_err)?
            }
        };

        let mut posts: Vec<Post> = rows_to_records(&rows)?;
        let next_cursor = if posts.len() > limit {
            posts.truncate(limit);
            posts.last().map(|p| cursor::encode(&p.create_at, &p.id))
        } else {
            None
        };

        Ok(FeedPage { posts, next_cursor })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::FeedConfig;
    use super::*;
    use crate::model::LikeTarget;
    use karmafeed_sql::SqliteStore;

    fn test_service() -> FeedService {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        FeedService::new(sql, FeedConfig::default()).unwrap()
    }

    /// Insert a post with a chosen timestamp, bypassing the service clock.
    fn post_at(svc: &FeedService, author_id: &str, title: &str, create_at: &str, id: &str) {
        let post = Post {
            id: id.to_string(),
            author_id: author_id.to_string(),
            title: title.to_string(),
            content: "0123456789".into(),
            create_at: create_at.to_string(),
            update_at: create_at.to_string(),
            like_count: 0,
            comment_count: 0,
        };
        svc.insert_record(
            "posts",
            &post.id,
            &post,
            &[
                ("author_id", Value::Text(post.author_id.clone())),
                ("create_at", Value::Text(post.create_at.clone())),
                ("update_at", Value::Text(post.update_at.clone())),
            ],
        )
        .unwrap();
    }

    #[test]
    fn create_post_validates() {
        let svc = test_service();
        let user = svc.create_user("alice").unwrap();

        assert!(matches!(
            svc.create_post(&user.id, "hi", "long enough content"),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            svc.create_post(&user.id, "a title", "short"),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            svc.create_post("ghost", "a title", "long enough content"),
            Err(ServiceError::NotFound(_))
        ));

        let post = svc
            .create_post(&user.id, "a title", "long enough content")
            .unwrap();
        assert_eq!(svc.get_post(&post.id).unwrap(), post);
    }

    #[test]
    fn update_post_protects_immutable_fields() {
        let svc = test_service();
        let user = svc.create_user("alice").unwrap();
        let post = svc
            .create_post(&user.id, "a title", "long enough content")
            .unwrap();

        let updated = svc
            .update_post(
                &post.id,
                serde_json::json!({
                    "title": "new title",
                    "authorId": "mallory",
                    "likeCount": 999,
                }),
            )
            .unwrap();

        assert_eq!(updated.title, "new title");
        assert_eq!(updated.author_id, user.id);
        assert_eq!(updated.like_count, 0);
        assert_eq!(updated.create_at, post.create_at);
    }

    #[test]
    fn feed_walk_covers_all_posts_once() {
        let svc = test_service();
        let user = svc.create_user("alice").unwrap();

        // Three distinct instants plus two posts sharing one instant,
        // so the id tie-break is exercised.
        post_at(&svc, &user.id, "p1", "2026-08-01T10:00:00+00:00", "a1");
        post_at(&svc, &user.id, "p2", "2026-08-01T11:00:00+00:00", "b1");
        post_at(&svc, &user.id, "p3", "2026-08-01T12:00:00+00:00", "c1");
        post_at(&svc, &user.id, "p4", "2026-08-01T12:00:00+00:00", "c2");
        post_at(&svc, &user.id, "p5", "2026-08-01T13:00:00+00:00", "d1");

        let mut seen = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = svc.feed_page(cursor.as_deref(), Some(2)).unwrap();
            assert!(page.posts.len() <= 2);
            seen.extend(page.posts.iter().map(|p| p.id.clone()));
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        // Newest first; same-instant posts ordered by id descending.
        assert_eq!(seen, vec!["d1", "c2", "c1", "b1", "a1"]);
    }

    #[test]
    fn feed_page_rejects_bad_cursor() {
        let svc = test_service();
        assert!(matches!(
            svc.feed_page(Some("!!!"), None),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn delete_post_cascades_but_keeps_karma() {
        let svc = test_service();
        let author = svc.create_user("alice").unwrap();
        let fan = svc.create_user("bobby").unwrap();
        let post = svc
            .create_post(&author.id, "a title", "long enough content")
            .unwrap();
        let comment = svc
            .create_comment(&post.id, &fan.id, None, "nice post")
            .unwrap();

        svc.toggle_like(&fan.id, &LikeTarget::Post(post.id.clone()))
            .unwrap();
        svc.toggle_like(&author.id, &LikeTarget::Comment(comment.id.clone()))
            .unwrap();

        svc.delete_post(&post.id).unwrap();

        assert!(matches!(
            svc.get_post(&post.id),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            svc.get_comment(&comment.id),
            Err(ServiceError::NotFound(_))
        ));

        let likes = svc
            .sql
            .query("SELECT COUNT(*) AS cnt FROM likes", &[])
            .unwrap();
        assert_eq!(likes[0].get_i64("cnt"), Some(0));

        // The ledger is append-only: deleting content never erases karma.
        let events = svc
            .sql
            .query("SELECT COUNT(*) AS cnt FROM karma_events", &[])
            .unwrap();
        assert_eq!(events[0].get_i64("cnt"), Some(2));
    }
}
