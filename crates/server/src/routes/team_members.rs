use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    team_member::{CreateTeamMember, TeamMember, UpdateTeamMember},
    user::User,
};
use serde::Deserialize;
use utils::response::ApiResponse;

use crate::{Deployment, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct TeamMemberFilter {
    pub project_id: Option<i64>,
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "super::default_limit")]
    pub limit: u64,
}

pub async fn get_team_members(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Query(filter): Query<TeamMemberFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<TeamMember>>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let members = match filter.project_id {
        Some(project_id) => {
            TeamMember::find_by_project_id(&deployment.db().pool, project_id).await?
        }
        None => TeamMember::find_all(&deployment.db().pool, filter.skip, filter.limit).await?,
    };
    Ok(ResponseJson(ApiResponse::success(members)))
}

pub async fn get_team_member(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<TeamMember>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let member = TeamMember::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team member not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(member)))
}

/// When a user holds several memberships, the lowest-id one wins.
pub async fn get_team_member_by_user_name(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(name): Path<String>,
) -> Result<ResponseJson<ApiResponse<TeamMember>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let member = TeamMember::find_by_user_name(&deployment.db().pool, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team member not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(member)))
}

pub async fn create_team_member(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Json(payload): Json<CreateTeamMember>,
) -> Result<ResponseJson<ApiResponse<TeamMember>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, None)
        .await?;
    let member = TeamMember::create(&deployment.db().pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(member)))
}

pub async fn update_team_member(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTeamMember>,
) -> Result<ResponseJson<ApiResponse<TeamMember>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, None)
        .await?;
    let member = TeamMember::update(&deployment.db().pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(member)))
}

pub async fn delete_team_member(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<TeamMember>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, None)
        .await?;
    let snapshot = TeamMember::delete_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team member not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

pub async fn delete_team_member_by_user_name(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(name): Path<String>,
) -> Result<ResponseJson<ApiResponse<TeamMember>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, None)
        .await?;
    let snapshot = TeamMember::delete_by_user_name(&deployment.db().pool, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team member not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

pub fn router() -> Router<Deployment> {
    Router::new()
        .route(
            "/team-members",
            get(get_team_members).post(create_team_member),
        )
        .route(
            "/team-members/by-user-name/{name}",
            get(get_team_member_by_user_name).delete(delete_team_member_by_user_name),
        )
        .route(
            "/team-members/{id}",
            get(get_team_member)
                .put(update_team_member)
                .delete(delete_team_member),
        )
}
