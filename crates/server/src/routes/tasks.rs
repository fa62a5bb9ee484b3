use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    task::{CreateTask, EditTask, Task, TaskState},
    team_member::TeamMember,
    user::User,
};
use serde::Deserialize;
use utils::response::ApiResponse;

use crate::{Deployment, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct TaskFilter {
    pub project_id: Option<i64>,
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "super::default_limit")]
    pub limit: u64,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub name: String,
    pub description: Option<String>,
    pub state: Option<TaskState>,
    pub assignee_id: Option<i64>,
    /// Resolved through the user's lowest-id membership; takes precedence
    /// over `assignee_id` when both are given.
    pub assignee_name: Option<String>,
    pub project_id: i64,
    pub requirement_link: String,
}

#[derive(Debug, Deserialize)]
pub struct EditTaskRequest {
    pub state: Option<TaskState>,
    pub assignee_id: Option<i64>,
    pub assignee_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditDescriptionRequest {
    pub description: String,
}

async fn resolve_assignee(
    deployment: &Deployment,
    assignee_name: Option<String>,
    assignee_id: Option<i64>,
) -> Result<Option<i64>, ApiError> {
    match assignee_name {
        Some(name) => {
            let member = TeamMember::find_by_user_name(&deployment.db().pool, &name)
                .await?
                .ok_or_else(|| ApiError::NotFound("Assignee not found".to_string()))?;
            Ok(Some(member.id))
        }
        None => Ok(assignee_id),
    }
}

pub async fn get_tasks(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Query(filter): Query<TaskFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<Task>>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, filter.project_id)
        .await?;
    let tasks = match filter.project_id {
        Some(project_id) => Task::find_by_project_id(&deployment.db().pool, project_id).await?,
        None => Task::find_all(&deployment.db().pool, filter.skip, filter.limit).await?,
    };
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn get_task(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let task = Task::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn get_task_by_name(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(name): Path<String>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let task = Task::find_by_name(&deployment.db().pool, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn create_task(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let manager = deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, Some(payload.project_id))
        .await?;

    let assignee_id =
        resolve_assignee(&deployment, payload.assignee_name, payload.assignee_id).await?;

    let task = Task::create(
        &deployment.db().pool,
        &CreateTask {
            name: payload.name,
            description: payload.description,
            state: payload.state,
            assignee_id,
            project_id: payload.project_id,
            requirement_link: payload.requirement_link,
        },
        manager.id,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn edit_task(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
    Json(payload): Json<EditTaskRequest>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let existing = Task::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, Some(existing.project_id))
        .await?;

    let assignee_id =
        resolve_assignee(&deployment, payload.assignee_name, payload.assignee_id).await?;

    let task = Task::edit(
        &deployment.db().pool,
        id,
        &EditTask {
            state: payload.state,
            assignee_id,
        },
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn edit_task_description(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
    Json(payload): Json<EditDescriptionRequest>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let existing = Task::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, Some(existing.project_id))
        .await?;

    let task = Task::edit_description(&deployment.db().pool, id, payload.description).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn delete_task(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let existing = Task::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, Some(existing.project_id))
        .await?;
    let snapshot = Task::delete_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

pub async fn delete_task_by_name(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(name): Path<String>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let existing = Task::find_by_name(&deployment.db().pool, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, Some(existing.project_id))
        .await?;
    let snapshot = Task::delete_by_name(&deployment.db().pool, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

pub fn router() -> Router<Deployment> {
    Router::new()
        .route("/tasks", get(get_tasks).post(create_task))
        .route(
            "/tasks/by-name/{name}",
            get(get_task_by_name).delete(delete_task_by_name),
        )
        .route(
            "/tasks/{id}",
            get(get_task).put(edit_task).delete(delete_task),
        )
        .route(
            "/tasks/{id}/description",
            axum::routing::patch(edit_task_description),
        )
}
