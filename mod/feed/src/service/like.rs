use tracing::debug;

use karmafeed_core::{ServiceError, new_id, now_rfc3339};
use karmafeed_sql::{SQLError, Value};

use super::{FeedService, karma, storage_err};
use crate::model::{KarmaEventKind, Like, LikeAction, LikeTarget, LikeToggle};

impl FeedService {
    /// Toggle a like for `(actor, target)`.
    ///
    /// The insert is always attempted first — there is no
    /// check-then-insert, because a check reopens the race it is meant
    /// to close. The unique index on (actor_id, target_kind, target_id)
    /// is the single arbiter of whether the like already exists:
    ///
    /// - The insert lands → same transaction: bump the target's
    ///   like_count and, unless the actor owns the target, append one
    ///   karma event. Returns `created`.
    /// - The insert hits the constraint → same transaction: this is the
    ///   reverse transition, not an error. Delete the existing row and
    ///   drop like_count. Returns `removed`. Karma already granted for
    ///   the earlier like stays on the ledger.
    /// - Anything else fails the whole transaction; the caller may
    ///   retry, the end state is well-defined either way.
    pub fn toggle_like(
        &self,
        actor_id: &str,
        target: &LikeTarget,
    ) -> Result<LikeToggle, ServiceError> {
        self.get_user(actor_id)?;
        let owner_id = match target {
            LikeTarget::Post(id) => self.get_post(id)?.author_id,
            LikeTarget::Comment(id) => self.get_comment(id)?.author_id,
        };

        let like = Like {
            id: new_id(),
            actor_id: actor_id.to_string(),
            target: target.clone(),
            create_at: now_rfc3339(),
        };
        let data =
            serde_json::to_string(&like).map_err(|e| ServiceError::Internal(e.to_string()))?;

        let table = match target {
            LikeTarget::Post(_) => "posts",
            LikeTarget::Comment(_) => "comments",
        };
        let target_key = [
            Value::Text(actor_id.to_string()),
            Value::Text(target.kind().to_string()),
            Value::Text(target.id().to_string()),
        ];

        let mut action = LikeAction::Removed;
        self.sql
            .with_tx(&mut |tx| {
                let inserted = tx.exec(
                    "INSERT INTO likes (id, data, actor_id, target_kind, target_id, create_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    &[
                        Value::Text(like.id.clone()),
                        Value::Text(data.clone()),
                        target_key[0].clone(),
                        target_key[1].clone(),
                        target_key[2].clone(),
                        Value::Text(like.create_at.clone()),
                    ],
                );
                match inserted {
                    Ok(_) => {
                        tx.exec(
                            &format!(
                                "UPDATE {table} SET like_count = like_count + 1, \
                                 data = json_set(data, '$.likeCount', \
                                                 json_extract(data, '$.likeCount') + 1) \
                                 WHERE id = ?1"
                            ),
                            &[target_key[2].clone()],
                        )?;
                        // Liking your own content records the like but
                        // earns nothing.
                        if owner_id != actor_id {
                            karma::record_like_karma(tx, &owner_id, actor_id, target)?;
                        }
                        action = LikeAction::Created;
                        Ok(())
                    }
                    Err(SQLError::Constraint(_)) => {
                        tx.exec(
                            "DELETE FROM likes WHERE actor_id = ?1 \
                             AND target_kind = ?2 AND target_id = ?3",
                            &target_key,
                        )?;
                        tx.exec(
                            &format!(
                                "UPDATE {table} SET like_count = like_count - 1, \
                                 data = json_set(data, '$.likeCount', \
                                                 json_extract(data, '$.likeCount') - 1) \
                                 WHERE id = ?1"
                            ),
                            &[target_key[2].clone()],
                        )?;
                        action = LikeAction::Removed;
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            })
            .map_err(storage_err)?;

        let karma_delta = if action == LikeAction::Created && owner_id != actor_id {
            KarmaEventKind::for_target(target).delta()
        } else {
            0
        };

        debug!(
            actor = actor_id,
            kind = target.kind(),
            target = target.id(),
            ?action,
            "like toggled"
        );

        Ok(LikeToggle { action, karma_delta })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};

    use super::super::FeedConfig;
    use super::*;
    use crate::model::{Post, User};
    use karmafeed_sql::SqliteStore;

    fn test_service() -> Arc<FeedService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        Arc::new(FeedService::new(sql, FeedConfig::default()).unwrap())
    }

    fn seed(svc: &FeedService) -> (User, User, Post) {
        let author = svc.create_user("alice").unwrap();
        let fan = svc.create_user("bobby").unwrap();
        let post = svc
            .create_post(&author.id, "a title", "long enough content")
            .unwrap();
        (author, fan, post)
    }

    fn like_rows(svc: &FeedService) -> i64 {
        svc.sql
            .query("SELECT COUNT(*) AS cnt FROM likes", &[])
            .unwrap()[0]
            .get_i64("cnt")
            .unwrap()
    }

    fn karma_rows(svc: &FeedService) -> i64 {
        svc.sql
            .query("SELECT COUNT(*) AS cnt FROM karma_events", &[])
            .unwrap()[0]
            .get_i64("cnt")
            .unwrap()
    }

    #[test]
    fn toggle_alternates_created_and_removed() {
        let svc = test_service();
        let (_, fan, post) = seed(&svc);
        let target = LikeTarget::Post(post.id.clone());

        let first = svc.toggle_like(&fan.id, &target).unwrap();
        assert_eq!(first.action, LikeAction::Created);
        assert_eq!(first.karma_delta, 5);
        assert_eq!(svc.get_post(&post.id).unwrap().like_count, 1);

        let second = svc.toggle_like(&fan.id, &target).unwrap();
        assert_eq!(second.action, LikeAction::Removed);
        assert_eq!(second.karma_delta, 0);
        assert_eq!(svc.get_post(&post.id).unwrap().like_count, 0);
        assert_eq!(like_rows(&svc), 0);
    }

    #[test]
    fn even_toggles_return_to_start_odd_land_on_liked() {
        let svc = test_service();
        let (_, fan, post) = seed(&svc);
        let target = LikeTarget::Post(post.id.clone());

        for _ in 0..4 {
            svc.toggle_like(&fan.id, &target).unwrap();
        }
        assert_eq!(svc.get_post(&post.id).unwrap().like_count, 0);
        assert_eq!(like_rows(&svc), 0);

        for _ in 0..3 {
            svc.toggle_like(&fan.id, &target).unwrap();
        }
        assert_eq!(svc.get_post(&post.id).unwrap().like_count, 1);
        assert_eq!(like_rows(&svc), 1);
    }

    #[test]
    fn self_like_counts_but_earns_nothing() {
        let svc = test_service();
        let (author, _, post) = seed(&svc);

        let toggle = svc
            .toggle_like(&author.id, &LikeTarget::Post(post.id.clone()))
            .unwrap();
        assert_eq!(toggle.action, LikeAction::Created);
        assert_eq!(toggle.karma_delta, 0);
        assert_eq!(svc.get_post(&post.id).unwrap().like_count, 1);
        assert_eq!(karma_rows(&svc), 0);
    }

    #[test]
    fn comment_like_grants_one_karma() {
        let svc = test_service();
        let (author, fan, post) = seed(&svc);
        let comment = svc
            .create_comment(&post.id, &author.id, None, "root")
            .unwrap();

        let toggle = svc
            .toggle_like(&fan.id, &LikeTarget::Comment(comment.id.clone()))
            .unwrap();
        assert_eq!(toggle.karma_delta, 1);
        assert_eq!(svc.get_comment(&comment.id).unwrap().like_count, 1);
        assert_eq!(karma_rows(&svc), 1);
    }

    #[test]
    fn missing_target_is_not_found() {
        let svc = test_service();
        let (_, fan, _) = seed(&svc);
        let err = svc
            .toggle_like(&fan.id, &LikeTarget::Post("ghost".into()))
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn concurrent_toggles_never_leave_duplicates() {
        let svc = test_service();
        let (_, fan, post) = seed(&svc);
        let target = LikeTarget::Post(post.id.clone());

        const THREADS: usize = 8;
        let barrier = Arc::new(Barrier::new(THREADS));
        let mut handles = Vec::new();
        for _ in 0..THREADS {
            let svc = Arc::clone(&svc);
            let barrier = Arc::clone(&barrier);
            let fan_id = fan.id.clone();
            let target = target.clone();
            handles.push(std::thread::spawn(move || {
                barrier.wait();
                svc.toggle_like(&fan_id, &target).unwrap().action
            }));
        }

        let mut created = 0i64;
        let mut removed = 0i64;
        for handle in handles {
            match handle.join().unwrap() {
                LikeAction::Created => created += 1,
                LikeAction::Removed => removed += 1,
            }
        }

        // Whatever the interleaving: no duplicate rows, counter matches
        // the surviving rows, every removal paired with a creation, and
        // every karma event justified by exactly one creation.
        let surviving = like_rows(&svc);
        assert!(surviving == 0 || surviving == 1);
        assert_eq!(created, removed + surviving);
        assert!(created >= 1);
        assert_eq!(svc.get_post(&post.id).unwrap().like_count, surviving);
        assert_eq!(karma_rows(&svc), created);
    }
}
