use axum::{
    Extension, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{requirement::Requirement, user::User};
use utils::response::ApiResponse;

use super::Pagination;
use crate::{Deployment, error::ApiError};

// Requirements are created as a side effect of task creation; the HTTP
// surface is read-only.

pub async fn get_requirements(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Query(pagination): Query<Pagination>,
) -> Result<ResponseJson<ApiResponse<Vec<Requirement>>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let requirements =
        Requirement::find_all(&deployment.db().pool, pagination.skip, pagination.limit).await?;
    Ok(ResponseJson(ApiResponse::success(requirements)))
}

pub async fn get_requirement(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Requirement>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let requirement = Requirement::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Requirement not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(requirement)))
}

pub fn router() -> Router<Deployment> {
    Router::new()
        .route("/requirements", get(get_requirements))
        .route("/requirements/{id}", get(get_requirement))
}
