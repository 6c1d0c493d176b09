use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use crate::model::{FeedPage, Post};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post).get(feed_page))
        .route(
            "/posts/{id}",
            get(get_post).patch(update_post).delete(delete_post),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePostBody {
    author_id: String,
    title: String,
    content: String,
}

async fn create_post(
    State(svc): State<AppState>,
    Json(body): Json<CreatePostBody>,
) -> Result<Json<Post>, ApiError> {
    ok_json(svc.create_post(&body.author_id, &body.title, &body.content))
}

#[derive(Deserialize)]
struct FeedQuery {
    cursor: Option<String>,
    limit: Option<usize>,
}

async fn feed_page(
    State(svc): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedPage>, ApiError> {
    ok_json(svc.feed_page(query.cursor.as_deref(), query.limit))
}

async fn get_post(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    ok_json(svc.get_post(&id))
}

async fn update_post(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Post>, ApiError> {
    ok_json(svc.update_post(&id, patch))
}

async fn delete_post(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    svc.delete_post(&id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
