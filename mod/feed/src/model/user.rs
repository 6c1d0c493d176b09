use serde::{Deserialize, Serialize};

/// A feed user. Only identity and display name live in this module;
/// credentials and sessions belong to an auth collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,

    /// Unique handle, shown on posts, comments, and the leaderboard.
    pub username: String,

    pub create_at: String,
}
