use serde::{Deserialize, Serialize};

use super::like::LikeTarget;

// Karma granted per like, by target kind. Stored on every event so the
// values can change later without rewriting history.
pub const KARMA_POST_LIKE: i64 = 5;
pub const KARMA_COMMENT_LIKE: i64 = 1;

/// Kind of a karma-granting event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KarmaEventKind {
    PostLiked,
    CommentLiked,
}

impl KarmaEventKind {
    pub fn for_target(target: &LikeTarget) -> Self {
        match target {
            LikeTarget::Post(_) => KarmaEventKind::PostLiked,
            LikeTarget::Comment(_) => KarmaEventKind::CommentLiked,
        }
    }

    /// Karma points this kind of event grants.
    pub fn delta(&self) -> i64 {
        match self {
            KarmaEventKind::PostLiked => KARMA_POST_LIKE,
            KarmaEventKind::CommentLiked => KARMA_COMMENT_LIKE,
        }
    }

    /// Stable discriminator stored in the `kind` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            KarmaEventKind::PostLiked => "post_liked",
            KarmaEventKind::CommentLiked => "comment_liked",
        }
    }
}

/// One entry of the append-only karma ledger.
///
/// Events are inserted and then never touched: no updates, no deletes.
/// Every karma figure in the system — leaderboards, per-user totals —
/// is a sum over these rows for some time window. No mutable per-user
/// counter exists anywhere.
///
/// `create_at` is assigned by the server at insert time and is never
/// taken from a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KarmaEvent {
    pub id: String,

    /// Who earned the karma (the liked content's author).
    pub recipient_id: String,

    /// Who triggered the event (the liker).
    pub actor_id: String,

    pub kind: KarmaEventKind,

    pub karma_delta: i64,

    /// What was liked, kept for auditing.
    pub target: LikeTarget,

    pub create_at: String,
}

/// One row of a karma leaderboard.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub username: String,
    pub total_karma: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_deltas() {
        assert_eq!(KarmaEventKind::PostLiked.delta(), 5);
        assert_eq!(KarmaEventKind::CommentLiked.delta(), 1);
    }

    #[test]
    fn kind_for_target() {
        assert_eq!(
            KarmaEventKind::for_target(&LikeTarget::Post("p".into())),
            KarmaEventKind::PostLiked
        );
        assert_eq!(
            KarmaEventKind::for_target(&LikeTarget::Comment("c".into())),
            KarmaEventKind::CommentLiked
        );
    }
}
