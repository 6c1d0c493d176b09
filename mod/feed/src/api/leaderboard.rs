use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::model::LeaderboardEntry;
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new().route("/leaderboard", get(leaderboard))
}

#[derive(Deserialize)]
struct LeaderboardQuery {
    /// Window size in hours; defaults to the last day.
    #[serde(default = "default_hours")]
    hours: i64,

    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_hours() -> i64 {
    24
}

fn default_limit() -> usize {
    5
}

async fn leaderboard(
    State(svc): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    ok_json(svc.leaderboard(chrono::Duration::hours(query.hours), query.limit))
}
