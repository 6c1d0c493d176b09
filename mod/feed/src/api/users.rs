use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::model::User;
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/karma", get(user_karma))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserBody {
    username: String,
}

async fn create_user(
    State(svc): State<AppState>,
    Json(body): Json<CreateUserBody>,
) -> Result<Json<User>, ApiError> {
    ok_json(svc.create_user(&body.username))
}

async fn get_user(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    ok_json(svc.get_user(&id))
}

#[derive(Deserialize)]
struct KarmaQuery {
    /// Window size in hours; defaults to the last day.
    #[serde(default = "default_hours")]
    hours: i64,
}

fn default_hours() -> i64 {
    24
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserKarma {
    user_id: String,
    hours: i64,
    total_karma: i64,
}

async fn user_karma(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<KarmaQuery>,
) -> Result<Json<UserKarma>, ApiError> {
    let total_karma = svc
        .user_karma(&id, chrono::Duration::hours(query.hours))
        .map_err(ApiError::from)?;
    Ok(Json(UserKarma {
        user_id: id,
        hours: query.hours,
        total_karma,
    }))
}
