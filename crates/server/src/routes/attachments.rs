use axum::{
    Extension, Json, Router,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::get,
};
use db::models::{
    attachment::{Attachment, CreateAttachment, UpdateAttachment},
    task::Task,
    user::User,
};
use serde::Deserialize;
use utils::response::ApiResponse;

use crate::{Deployment, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AttachmentFilter {
    pub task_id: i64,
}


pub async fn get_attachments(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Query(filter): Query<AttachmentFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<Attachment>>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let attachments = Attachment::find_by_task_id(&deployment.db().pool, filter.task_id).await?;
    Ok(ResponseJson(ApiResponse::success(attachments)))
}

pub async fn get_attachment(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Attachment>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let attachment = Attachment::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Attachment not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(attachment)))
}

/// Streams the stored bytes back with the recorded media type.
pub async fn download_attachment(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let (row, bytes) = deployment
        .attachments()
        .read_bytes(&deployment.db().pool, id)
        .await?;
    Ok(([(header::CONTENT_TYPE, row.media_type)], bytes).into_response())
}

/// Multipart upload: a `task_id` text field, optional `name` and `path`
/// overrides, and the `file` part itself.
pub async fn create_attachment(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    mut multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<Attachment>>, ApiError> {
    let mut task_id: Option<i64> = None;
    let mut name: Option<String> = None;
    let mut path: Option<String> = None;
    let mut media_type: Option<String> = None;
    let mut bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("task_id") => {
                let text = field.text().await?;
                task_id = Some(text.trim().parse::<i64>().map_err(|_| {
                    ApiError::BadRequest("task_id must be an integer".to_string())
                })?);
            }
            Some("name") => {
                name = Some(field.text().await?);
            }
            Some("path") => {
                path = Some(field.text().await?);
            }
            Some("file") => {
                if name.is_none() {
                    name = field.file_name().map(str::to_string);
                }
                media_type = field.content_type().map(str::to_string);
                bytes = Some(field.bytes().await?.to_vec());
            }
            _ => {}
        }
    }

    let task_id =
        task_id.ok_or_else(|| ApiError::BadRequest("task_id field is required".to_string()))?;
    let name = name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("attachment name is required".to_string()))?;
    let bytes =
        bytes.ok_or_else(|| ApiError::BadRequest("file field is required".to_string()))?;
    let media_type = media_type
        .unwrap_or_else(|| mime_guess::from_path(&name).first_or_octet_stream().to_string());
    let path = path
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| format!("task-{task_id}"));

    let task = Task::find_by_id(&deployment.db().pool, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, Some(task.project_id))
        .await?;

    let attachment = deployment
        .attachments()
        .create(
            &deployment.db().pool,
            &CreateAttachment {
                name,
                path,
                media_type,
                task_id,
            },
            &bytes,
        )
        .await?;
    Ok(ResponseJson(ApiResponse::success(attachment)))
}

pub async fn update_attachment(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateAttachment>,
) -> Result<ResponseJson<ApiResponse<Attachment>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let attachment = deployment
        .attachments()
        .update(&deployment.db().pool, id, &payload)
        .await?;
    Ok(ResponseJson(ApiResponse::success(attachment)))
}

pub async fn delete_attachment(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Attachment>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let snapshot = deployment
        .attachments()
        .delete(&deployment.db().pool, id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

pub async fn delete_attachment_by_name(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(name): Path<String>,
) -> Result<ResponseJson<ApiResponse<Attachment>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let snapshot = deployment
        .attachments()
        .delete_by_name(&deployment.db().pool, &name)
        .await?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

pub fn router() -> Router<Deployment> {
    Router::new()
        .route("/attachments", get(get_attachments).post(create_attachment))
        .route(
            "/attachments/by-name/{name}",
            axum::routing::delete(delete_attachment_by_name),
        )
        .route(
            "/attachments/{id}",
            get(get_attachment)
                .patch(update_attachment)
                .delete(delete_attachment),
        )
        .route("/attachments/{id}/file", get(download_attachment))
}
