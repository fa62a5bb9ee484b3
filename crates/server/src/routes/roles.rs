use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{delete, get},
};
use db::models::{
    role::{CreateRole, Role},
    user::User,
};
use serde::Deserialize;
use utils::response::ApiResponse;

use super::Pagination;
use crate::{Deployment, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: String,
}

pub async fn get_roles(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Query(pagination): Query<Pagination>,
) -> Result<ResponseJson<ApiResponse<Vec<Role>>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let roles = Role::find_all(&deployment.db().pool, pagination.skip, pagination.limit).await?;
    Ok(ResponseJson(ApiResponse::success(roles)))
}

pub async fn get_role(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Role>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let role = Role::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Role not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(role)))
}

pub async fn create_role(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Json(payload): Json<CreateRole>,
) -> Result<ResponseJson<ApiResponse<Role>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, None)
        .await?;
    let role = Role::create(&deployment.db().pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(role)))
}

pub async fn update_role(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<ResponseJson<ApiResponse<Role>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, None)
        .await?;
    let role = Role::update(&deployment.db().pool, id, payload.name).await?;
    Ok(ResponseJson(ApiResponse::success(role)))
}

pub async fn delete_role(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Role>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, None)
        .await?;
    let snapshot = Role::delete_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Role not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

pub async fn delete_role_by_name(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(name): Path<String>,
) -> Result<ResponseJson<ApiResponse<Role>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, None)
        .await?;
    let snapshot = Role::delete_by_name(&deployment.db().pool, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Role not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

pub fn router() -> Router<Deployment> {
    Router::new()
        .route("/roles", get(get_roles).post(create_role))
        .route(
            "/roles/{id}",
            get(get_role).put(update_role).delete(delete_role),
        )
        .route("/roles/by-name/{name}", delete(delete_role_by_name))
}
