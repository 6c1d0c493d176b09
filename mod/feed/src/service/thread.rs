use std::collections::HashMap;

use karmafeed_core::ServiceError;
use karmafeed_sql::Value;

use super::{FeedService, rows_to_records, storage_err};
use crate::model::{Comment, CommentNode, CommentView};

impl FeedService {
    /// Threaded view of a post's comments.
    ///
    /// The storage cost is a bounded number of fetches no matter how
    /// many comments the post has or how deeply they nest: the post
    /// check, one query for all of the post's comments, one query for
    /// their authors. Assembly itself is [`assemble`] — pure and
    /// storage-free.
    pub fn get_threaded_comments(&self, post_id: &str) -> Result<Vec<CommentNode>, ServiceError> {
        self.get_post(post_id)?;

        let rows = self
            .sql
            .query(
                "SELECT data FROM comments WHERE post_id = ?1 \
                 ORDER BY create_at ASC, id ASC",
                &[Value::Text(post_id.to_string())],
            )
            .map_err(storage_err)?;
        let comments: Vec<Comment> = rows_to_records(&rows)?;
        if comments.is_empty() {
            return Ok(Vec::new());
        }

        let usernames = self.author_usernames(&comments)?;
        let views = comments
            .into_iter()
            .map(|c| {
                let username = usernames.get(&c.author_id).cloned().unwrap_or_default();
                CommentView::new(c, username)
            })
            .collect();

        Ok(assemble(views))
    }

    /// Usernames for every distinct author in `comments`, one query.
    fn author_usernames(
        &self,
        comments: &[Comment],
    ) -> Result<HashMap<String, String>, ServiceError> {
        let mut ids: Vec<&str> = comments.iter().map(|c| c.author_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();

        let placeholders = (1..=ids.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let params: Vec<Value> = ids.iter().map(|id| Value::Text(id.to_string())).collect();

        let rows = self
            .sql
            .query(
                &format!("SELECT id, username FROM users WHERE id IN ({placeholders})"),
                &params,
            )
            .map_err(storage_err)?;

        let mut map = HashMap::with_capacity(rows.len());
        for row in &rows {
            if let (Some(id), Some(username)) = (row.get_str("id"), row.get_str("username")) {
                map.insert(id.to_string(), username.to_string());
            }
        }
        Ok(map)
    }
}

/// Assemble a flat, creation-ordered comment list into a forest.
///
/// Two passes, O(n) total, no recursion anywhere — the result is built
/// back-to-front with an explicit slot array, so arbitrarily deep
/// threads cost the same stack as shallow ones.
///
/// A comment whose parent is absent from the input becomes a root.
/// Dropping it would silently orphan its whole subtree; promoting it
/// keeps every input comment in the output exactly once.
pub fn assemble(comments: Vec<CommentView>) -> Vec<CommentNode> {
    let n = comments.len();

    // Pass 1: comment id -> position in the input.
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(n);
    for (i, c) in comments.iter().enumerate() {
        index.insert(c.id.as_str(), i);
    }

    // Pass 2: each comment joins its parent's child list or the root
    // list. The input is creation-ordered, so a genuine parent always
    // precedes its replies; a "parent" at or after its child cannot be
    // real and the child is promoted to a root instead.
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut roots: Vec<usize> = Vec::new();
    for (i, c) in comments.iter().enumerate() {
        match c.parent_id.as_deref().and_then(|p| index.get(p).copied()) {
            Some(p) if p < i => children[p].push(i),
            _ => roots.push(i),
        }
    }
    drop(index);

    // Build nodes from the last input position backwards: every child
    // position is greater than its parent's, so a node's replies are
    // always finished before the node itself is taken.
    let mut slots: Vec<Option<CommentNode>> = comments
        .into_iter()
        .map(|comment| {
            Some(CommentNode {
                comment,
                replies: Vec::new(),
            })
        })
        .collect();
    for i in (0..n).rev() {
        let replies: Vec<CommentNode> = children[i]
            .iter()
            .filter_map(|&j| slots[j].take())
            .collect();
        if let Some(node) = slots[i].as_mut() {
            node.replies = replies;
        }
    }

    roots.into_iter().filter_map(|i| slots[i].take()).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::super::FeedConfig;
    use super::*;
    use crate::model::CommentAuthor;
    use karmafeed_sql::{Row, SQLConn, SQLError, SQLStore, SqliteStore};

    fn view(id: &str, parent: Option<&str>, depth: i64) -> CommentView {
        CommentView {
            id: id.to_string(),
            post_id: "p1".into(),
            parent_id: parent.map(str::to_string),
            author: CommentAuthor {
                id: "u1".into(),
                username: "alice".into(),
            },
            content: format!("comment {id}"),
            create_at: format!("2026-08-01T00:00:{:02}+00:00", depth),
            like_count: 0,
            depth,
        }
    }

    /// Pre-order walk without recursion, mirroring how the assembler
    /// itself avoids the stack.
    fn preorder_ids(forest: &[CommentNode]) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack: Vec<&CommentNode> = forest.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node.comment.id.clone());
            for reply in node.replies.iter().rev() {
                stack.push(reply);
            }
        }
        out
    }

    #[test]
    fn empty_input_is_empty_forest() {
        assert!(assemble(Vec::new()).is_empty());
    }

    #[test]
    fn nests_and_keeps_input_order() {
        let forest = assemble(vec![
            view("a", None, 0),
            view("b", None, 0),
            view("a1", Some("a"), 1),
            view("a2", Some("a"), 1),
            view("a1x", Some("a1"), 2),
        ]);

        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].comment.id, "a");
        assert_eq!(forest[1].comment.id, "b");
        assert_eq!(forest[0].replies.len(), 2);
        assert_eq!(forest[0].replies[0].comment.id, "a1");
        assert_eq!(forest[0].replies[1].comment.id, "a2");
        assert_eq!(forest[0].replies[0].replies[0].comment.id, "a1x");

        assert_eq!(preorder_ids(&forest), vec!["a", "a1", "a1x", "a2", "b"]);
    }

    #[test]
    fn orphan_becomes_root_not_dropped() {
        // "c1"'s parent was filtered out upstream; its subtree must
        // still appear.
        let forest = assemble(vec![
            view("a", None, 0),
            view("c1", Some("missing"), 1),
            view("c2", Some("c1"), 2),
        ]);

        assert_eq!(forest.len(), 2);
        assert_eq!(forest[1].comment.id, "c1");
        assert_eq!(forest[1].replies[0].comment.id, "c2");
        assert_eq!(preorder_ids(&forest).len(), 3);
    }

    #[test]
    fn node_count_preserved_on_deep_chain() {
        // A 10 000-deep chain: recursion would overflow here.
        let mut input = vec![view("n0", None, 0)];
        for i in 1..10_000 {
            input.push(view(
                &format!("n{i}"),
                Some(&format!("n{}", i - 1)),
                i as i64,
            ));
        }

        let forest = assemble(input);
        assert_eq!(forest.len(), 1);
        assert_eq!(preorder_ids(&forest).len(), 10_000);
    }

    #[test]
    fn assembled_depth_matches_parent_chain() {
        let svc = {
            let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
            FeedService::new(sql, FeedConfig::default()).unwrap()
        };
        let user = svc.create_user("alice").unwrap();
        let post = svc
            .create_post(&user.id, "a title", "long enough content")
            .unwrap();

        let root = svc.create_comment(&post.id, &user.id, None, "root").unwrap();
        let reply = svc
            .create_comment(&post.id, &user.id, Some(&root.id), "reply")
            .unwrap();
        svc.create_comment(&post.id, &user.id, Some(&reply.id), "deeper")
            .unwrap();

        let forest = svc.get_threaded_comments(&post.id).unwrap();
        assert_eq!(forest.len(), 1);

        // depth(root) == 0 and depth(child) == depth(parent) + 1, all
        // the way down.
        let mut stack: Vec<(&CommentNode, i64)> = vec![(&forest[0], 0)];
        while let Some((node, expected_depth)) = stack.pop() {
            assert_eq!(node.comment.depth, expected_depth);
            for reply in &node.replies {
                stack.push((reply, expected_depth + 1));
            }
        }
        assert_eq!(forest[0].comment.author.username, "alice");
    }

    // ── Storage fetch accounting ──

    struct CountingStore {
        inner: SqliteStore,
        fetches: AtomicUsize,
    }

    impl SQLStore for CountingStore {
        fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.query(sql, params)
        }

        fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
            self.inner.exec(sql, params)
        }

        fn with_tx(
            &self,
            f: &mut dyn FnMut(&dyn SQLConn) -> Result<(), SQLError>,
        ) -> Result<(), SQLError> {
            self.inner.with_tx(f)
        }
    }

    #[test]
    fn threaded_fetches_stay_constant() {
        let counting = Arc::new(CountingStore {
            inner: SqliteStore::open_in_memory().unwrap(),
            fetches: AtomicUsize::new(0),
        });
        let store: Arc<dyn SQLStore> = counting.clone();
        let svc = FeedService::new(store, FeedConfig::default()).unwrap();

        let user = svc.create_user("alice").unwrap();
        let post = svc
            .create_post(&user.id, "a title", "long enough content")
            .unwrap();

        // 50 comments fanning out over five ancestors.
        let mut ancestors = Vec::new();
        for i in 0..5 {
            let c = svc
                .create_comment(&post.id, &user.id, None, &format!("ancestor {i}"))
                .unwrap();
            ancestors.push(c.id);
        }
        for i in 0..45 {
            let parent = &ancestors[i % 5];
            svc.create_comment(&post.id, &user.id, Some(parent), &format!("reply {i}"))
                .unwrap();
        }

        counting.fetches.store(0, Ordering::SeqCst);
        let forest = svc.get_threaded_comments(&post.id).unwrap();
        assert_eq!(preorder_ids(&forest).len(), 50);

        // Post check + comment fetch + author fetch. Never grows with
        // the comment count.
        assert!(counting.fetches.load(Ordering::SeqCst) <= 3);
    }
}
