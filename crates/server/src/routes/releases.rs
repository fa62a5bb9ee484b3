use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{delete, get},
};
use db::models::{
    release::{CreateRelease, Release, UpdateRelease},
    user::User,
};
use utils::response::ApiResponse;

use super::Pagination;
use crate::{Deployment, error::ApiError};

pub async fn get_releases(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Query(pagination): Query<Pagination>,
) -> Result<ResponseJson<ApiResponse<Vec<Release>>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let releases =
        Release::find_all(&deployment.db().pool, pagination.skip, pagination.limit).await?;
    Ok(ResponseJson(ApiResponse::success(releases)))
}

pub async fn get_release(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Release>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let release = Release::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Release not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(release)))
}

pub async fn create_release(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Json(payload): Json<CreateRelease>,
) -> Result<ResponseJson<ApiResponse<Release>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, None)
        .await?;
    let release = Release::create(&deployment.db().pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(release)))
}

pub async fn update_release(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRelease>,
) -> Result<ResponseJson<ApiResponse<Release>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, None)
        .await?;
    let release = Release::update(&deployment.db().pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(release)))
}

pub async fn delete_release(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Release>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, None)
        .await?;
    let snapshot = Release::delete_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Release not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

pub async fn delete_release_by_name(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(name): Path<String>,
) -> Result<ResponseJson<ApiResponse<Release>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, None)
        .await?;
    let snapshot = Release::delete_by_name(&deployment.db().pool, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Release not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

pub fn router() -> Router<Deployment> {
    Router::new()
        .route("/releases", get(get_releases).post(create_release))
        .route(
            "/releases/{id}",
            get(get_release).put(update_release).delete(delete_release),
        )
        .route("/releases/by-name/{name}", delete(delete_release_by_name))
}
