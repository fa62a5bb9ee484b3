use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::user::{CreateUser, UpdateUser, User};
use serde::Deserialize;
use services::services::password::hash_password;
use utils::response::ApiResponse;

use super::Pagination;
use crate::{Deployment, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Must repeat `password` exactly.
    pub password2: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password2: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

/// Signup is public; the confirmation field has to match before anything
/// is hashed.
pub async fn create_user(
    State(deployment): State<Deployment>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    if payload.password != payload.password2 {
        return Err(ApiError::BadRequest("Passwords do not match".to_string()));
    }

    let user = User::create(
        &deployment.db().pool,
        &CreateUser {
            name: payload.name,
            email: payload.email,
            password_hash: hash_password(&payload.password)?,
            is_active: payload.is_active,
        },
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

pub async fn get_users(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Query(pagination): Query<Pagination>,
) -> Result<ResponseJson<ApiResponse<Vec<User>>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let users = User::find_all(&deployment.db().pool, pagination.skip, pagination.limit).await?;
    Ok(ResponseJson(ApiResponse::success(users)))
}

pub async fn get_user(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let user = User::find_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

pub async fn get_user_by_email(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Query(query): Query<EmailQuery>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    deployment
        .auth()
        .require_member(&deployment.db().pool, &acting, None)
        .await?;
    let user = User::find_by_email(&deployment.db().pool, &query.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

/// Users may edit themselves; editing anyone else takes a manager.
pub async fn update_user(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    if acting.id != id {
        deployment
            .auth()
            .require_manager(&deployment.db().pool, &acting, None)
            .await?;
    }

    let password_hash = match (&payload.password, &payload.password2) {
        (None, None) => None,
        (Some(password), Some(password2)) if password == password2 => {
            Some(hash_password(password)?)
        }
        _ => {
            return Err(ApiError::BadRequest("Passwords do not match".to_string()));
        }
    };

    let user = User::update(
        &deployment.db().pool,
        id,
        &UpdateUser {
            name: payload.name,
            email: payload.email,
            password_hash,
            is_active: payload.is_active,
        },
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

pub async fn delete_user(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, None)
        .await?;
    let snapshot = User::delete_by_id(&deployment.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

pub async fn delete_user_by_email(
    State(deployment): State<Deployment>,
    Extension(acting): Extension<User>,
    Query(query): Query<EmailQuery>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    deployment
        .auth()
        .require_manager(&deployment.db().pool, &acting, None)
        .await?;
    let snapshot = User::delete_by_email(&deployment.db().pool, &query.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

pub fn router() -> Router<Deployment> {
    Router::new()
        .route("/users", get(get_users).post(create_user))
        .route(
            "/users/by-email",
            get(get_user_by_email).delete(delete_user_by_email),
        )
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}
