use axum::{
    Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::post,
};
use serde::{Deserialize, Serialize};
use utils::response::ApiResponse;

use crate::{Deployment, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

pub async fn login(
    State(deployment): State<Deployment>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<LoginResponse>>, ApiError> {
    let access_token = deployment
        .auth()
        .login(&deployment.db().pool, &payload.email, &payload.password)
        .await?;
    Ok(ResponseJson(ApiResponse::success(LoginResponse {
        access_token,
        token_type: "bearer",
    })))
}

pub fn router() -> Router<Deployment> {
    Router::new().route("/auth", post(login))
}
