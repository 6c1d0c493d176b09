use axum::{
    Json, Router,
    extract::State,
    routing::post,
};
use serde::Deserialize;

use crate::model::{LikeTarget, LikeToggle};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new().route("/likes/toggle", post(toggle_like))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToggleBody {
    actor_id: String,
    target: LikeTarget,
}

async fn toggle_like(
    State(svc): State<AppState>,
    Json(body): Json<ToggleBody>,
) -> Result<Json<LikeToggle>, ApiError> {
    ok_json(svc.toggle_like(&body.actor_id, &body.target))
}
