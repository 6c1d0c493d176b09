use serde::{Deserialize, Serialize};

/// Which record a like points at.
///
/// A tagged union rather than two tables: one `likes` relation serves
/// posts and comments alike, so the uniqueness constraint and the karma
/// aggregation each have a single enforcement point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum LikeTarget {
    Post(String),
    Comment(String),
}

impl LikeTarget {
    /// Stable discriminator stored in the `target_kind` column.
    pub fn kind(&self) -> &'static str {
        match self {
            LikeTarget::Post(_) => "post",
            LikeTarget::Comment(_) => "comment",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            LikeTarget::Post(id) => id,
            LikeTarget::Comment(id) => id,
        }
    }
}

/// One like by one actor on one target.
///
/// At most one row may exist per (actor, target kind, target id); the
/// storage layer's unique index enforces that, not application code.
/// Rows are created and deleted, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: String,

    pub actor_id: String,

    pub target: LikeTarget,

    pub create_at: String,
}

/// Which way a toggle went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LikeAction {
    Created,
    Removed,
}

/// Result of a like toggle.
///
/// `karma_delta` is the karma granted by this call: the event kind's
/// delta when a like was created for someone else's content, 0 for
/// removals and self-likes.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
    pub action: LikeAction,
    pub karma_delta: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_wire_format_is_tagged() {
        let target = LikeTarget::Post("p1".into());
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "post", "id": "p1"}));

        let back: LikeTarget = serde_json::from_value(
            serde_json::json!({"kind": "comment", "id": "c9"}),
        )
        .unwrap();
        assert_eq!(back, LikeTarget::Comment("c9".into()));
    }

    #[test]
    fn like_json_roundtrip() {
        let like = Like {
            id: "l1".into(),
            actor_id: "u1".into(),
            target: LikeTarget::Post("p1".into()),
            create_at: "2026-01-01T00:00:00+00:00".into(),
        };
        let json = serde_json::to_value(&like).unwrap();
        assert_eq!(json["target"]["kind"], "post");
        assert_eq!(json["id"], "l1");
        let back: Like = serde_json::from_value(json).unwrap();
        assert_eq!(back, like);
    }
}
