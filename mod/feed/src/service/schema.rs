use karmafeed_core::ServiceError;
use karmafeed_sql::SQLStore;

/// SQL schema for the feed module.
///
/// Every table follows the `id` + JSON `data` + indexed-columns layout.
/// The unique index on likes(actor_id, target_kind, target_id) is the
/// enforcement point for the one-like-per-actor-per-target invariant —
/// concurrent duplicate toggles are decided here, not in application
/// code. karma_events carries the (create_at, recipient_id) index that
/// the windowed leaderboard aggregation scans.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id        TEXT PRIMARY KEY,
        data      TEXT NOT NULL,
        username  TEXT NOT NULL,
        create_at TEXT NOT NULL
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON users(username)",
    "CREATE TABLE IF NOT EXISTS posts (
        id            TEXT PRIMARY KEY,
        data          TEXT NOT NULL,
        author_id     TEXT NOT NULL,
        create_at     TEXT NOT NULL,
        update_at     TEXT NOT NULL,
        like_count    INTEGER NOT NULL DEFAULT 0,
        comment_count INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id)",
    "CREATE INDEX IF NOT EXISTS idx_posts_feed ON posts(create_at DESC, id DESC)",
    "CREATE TABLE IF NOT EXISTS comments (
        id         TEXT PRIMARY KEY,
        data       TEXT NOT NULL,
        post_id    TEXT NOT NULL,
        parent_id  TEXT,
        author_id  TEXT NOT NULL,
        create_at  TEXT NOT NULL,
        like_count INTEGER NOT NULL DEFAULT 0,
        depth      INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id, create_at)",
    "CREATE INDEX IF NOT EXISTS idx_comments_parent ON comments(parent_id, create_at)",
    "CREATE TABLE IF NOT EXISTS likes (
        id          TEXT PRIMARY KEY,
        data        TEXT NOT NULL,
        actor_id    TEXT NOT NULL,
        target_kind TEXT NOT NULL,
        target_id   TEXT NOT NULL,
        create_at   TEXT NOT NULL
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_likes_actor_target
        ON likes(actor_id, target_kind, target_id)",
    "CREATE INDEX IF NOT EXISTS idx_likes_target ON likes(target_kind, target_id)",
    "CREATE TABLE IF NOT EXISTS karma_events (
        id           TEXT PRIMARY KEY,
        data         TEXT NOT NULL,
        recipient_id TEXT NOT NULL,
        actor_id     TEXT NOT NULL,
        kind         TEXT NOT NULL,
        karma_delta  INTEGER NOT NULL,
        create_at    TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_karma_window ON karma_events(create_at, recipient_id)",
    "CREATE INDEX IF NOT EXISTS idx_karma_recipient ON karma_events(recipient_id, create_at)",
];

/// Create all feed tables and indexes. Idempotent.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("feed schema init: {e}")))?;
    }
    Ok(())
}
