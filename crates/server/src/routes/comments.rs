use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    comment::{Comment, CreateComment},
    user::User,
};
use serde::Deserialize;
use utils::response::ApiResponse;

use crate::{Deployment, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CommentFilter {
    pub task_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub message: String,
}

pub async fn get_comments(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Query(filter): Query<CommentFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<Comment>>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let comments = Comment::find_by_task_id(&deployment.db().pool, filter.task_id).await?;
    Ok(ResponseJson(ApiResponse::success(comments)))
}

pub async fn get_comment(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Comment>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let comment = Comment::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(comment)))
}

/// The state snapshot comes from the caller; the referenced task is never
/// looked up, so a comment on a missing task is accepted.
pub async fn create_comment(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Json(payload): Json<CreateComment>,
) -> Result<ResponseJson<ApiResponse<Comment>>, ApiError> {
    let member = deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let comment = Comment::create(&deployment.db().pool, &payload, member.id).await?;
    Ok(ResponseJson(ApiResponse::success(comment)))
}

/// Only the comment's author may change it.
pub async fn update_comment(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<ResponseJson<ApiResponse<Comment>>, ApiError> {
    let existing = Comment::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    let member = deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    if existing.creator_id != member.id {
        return Err(ApiError::Forbidden(
            "Only the comment's author may edit it".to_string(),
        ));
    }

    let comment = Comment::update_message(&deployment.db().pool, id, payload.message).await?;
    Ok(ResponseJson(ApiResponse::success(comment)))
}

/// Only the comment's author may delete it.
pub async fn delete_comment(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Comment>>, ApiError> {
    let existing = Comment::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    let member = deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    if existing.creator_id != member.id {
        return Err(ApiError::Forbidden(
            "Only the comment's author may delete it".to_string(),
        ));
    }

    let snapshot = Comment::delete_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

pub fn router() -> Router<Deployment> {
    Router::new()
        .route("/comments", get(get_comments).post(create_comment))
        .route(
            "/comments/{id}",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
}
