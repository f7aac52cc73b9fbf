use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    community::{
        dto::{CreatePostRequest, ReplyRequest},
        repo::{self, PostWithReplies},
    },
    error::ApiError,
    state::AppState,
};

pub fn community_routes() -> Router<AppState> {
    Router::new()
        .route("/community/post", post(create_post))
        .route("/community/all", get(list_posts))
        .route("/community/reply/:post_id", post(reply_to_post))
}

#[instrument(skip(state, user, payload))]
async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = repo::insert_post(
        &state.db,
        user.id,
        &user.name,
        &payload.title,
        &payload.content,
    )
    .await?;
    info!(user_id = %user.id, post_id = %id, "community post created");
    Ok(Json(json!({ "message": "Post created", "id": id })))
}

/// Public listing: the 100 most recent posts, newest first.
#[instrument(skip(state))]
async fn list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostWithReplies>>, ApiError> {
    let posts = repo::recent_posts_with_replies(&state.db, 100).await?;
    Ok(Json(posts))
}

#[instrument(skip(state, user, payload))]
async fn reply_to_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<ReplyRequest>,
) -> Result<Json<Value>, ApiError> {
    if !repo::post_exists(&state.db, post_id).await? {
        return Err(ApiError::NotFound("Post"));
    }
    repo::insert_reply(&state.db, post_id, user.id, &user.name, &payload.message).await?;
    info!(user_id = %user.id, post_id = %post_id, "reply added");
    Ok(Json(json!({ "message": "Reply added" })))
}
