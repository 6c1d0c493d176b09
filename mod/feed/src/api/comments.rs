use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, post},
};
use serde::Deserialize;

use crate::model::{Comment, CommentNode};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/posts/{id}/comments",
            post(create_comment).get(threaded_comments),
        )
        .route("/comments/{id}", delete(delete_comment))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCommentBody {
    author_id: String,
    #[serde(default)]
    parent_id: Option<String>,
    content: String,
}

async fn create_comment(
    State(svc): State<AppState>,
    Path(post_id): Path<String>,
    Json(body): Json<CreateCommentBody>,
) -> Result<Json<Comment>, ApiError> {
    ok_json(svc.create_comment(
        &post_id,
        &body.author_id,
        body.parent_id.as_deref(),
        &body.content,
    ))
}

async fn threaded_comments(
    State(svc): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<CommentNode>>, ApiError> {
    ok_json(svc.get_threaded_comments(&post_id))
}

async fn delete_comment(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    svc.delete_comment(&id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
