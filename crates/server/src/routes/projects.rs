use axum::{
    Extension, Json, Router,
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Json as ResponseJson},
    routing::get,
};
use db::models::{
    project::{CreateProject, Project, UpdateProject},
    user::User,
};
use futures_util::{SinkExt, StreamExt};
use utils::response::ApiResponse;

use super::Pagination;
use crate::{Deployment, error::ApiError};

pub async fn get_projects(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Query(pagination): Query<Pagination>,
) -> Result<ResponseJson<ApiResponse<Vec<Project>>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let projects =
        Project::find_all(&deployment.db().pool, pagination.skip, pagination.limit).await?;
    Ok(ResponseJson(ApiResponse::success(projects)))
}

pub async fn get_project(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let project = Project::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn get_project_by_name(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(name): Path<String>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let project = Project::find_by_name(&deployment.db().pool, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn create_project(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Json(payload): Json<CreateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, None)
        .await?;
    tracing::debug!("Creating project '{}'", payload.name);
    let project = Project::create(&deployment.db().pool, &payload, acting.id).await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn update_project(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, Some(id))
        .await?;
    let project = Project::update(&deployment.db().pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// Memberships, tasks and the rest of the project's graph are left in
/// place; nothing cascades.
pub async fn delete_project(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, Some(id))
        .await?;
    let snapshot = Project::delete_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

pub async fn delete_project_by_name(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(name): Path<String>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, None)
        .await?;
    let snapshot = Project::delete_by_name(&deployment.db().pool, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

/// Text-frame request/response shim: each incoming frame is a project name,
/// each reply the matching project JSON (or an error envelope).
pub async fn project_lookup_ws(
    ws: WebSocketUpgrade,
    State(deployment): State<Deployment>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = handle_project_lookup_ws(socket, deployment).await {
            tracing::warn!("project lookup WS closed: {}", e);
        }
    })
}

async fn handle_project_lookup_ws(socket: WebSocket, deployment: Deployment) -> anyhow::Result<()> {
    let (mut sender, mut receiver) = socket.split();

    while let Some(message) = receiver.next().await {
        let Ok(message) = message else {
            break;
        };
        let Message::Text(name) = message else {
            // Ignore binary and control frames; axum answers pings itself.
            continue;
        };

        let reply = match Project::find_by_name(&deployment.db().pool, name.as_str()).await {
            Ok(Some(project)) => serde_json::to_string(&ApiResponse::success(project))?,
            Ok(None) => serde_json::to_string(&ApiResponse::<Project>::error("Project not found"))?,
            Err(e) => {
                tracing::error!("project lookup failed: {}", e);
                serde_json::to_string(&ApiResponse::<Project>::error("Lookup failed"))?
            }
        };
        if sender.send(Message::Text(reply.into())).await.is_err() {
            break;
        }
    }

    let _ = sender.close().await;
    Ok(())
}

pub fn router() -> Router<Deployment> {
    Router::new()
        .route("/projects", get(get_projects).post(create_project))
        .route("/projects/lookup/ws", get(project_lookup_ws))
        .route(
            "/projects/by-name/{name}",
            get(get_project_by_name).delete(delete_project_by_name),
        )
        .route(
            "/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
}
