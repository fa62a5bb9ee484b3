use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::{
    DatabaseError as DbErr,
    models::{
        attachment::AttachmentError, comment::CommentError, project::ProjectError,
        release::ReleaseError, role::RoleError, task::TaskError, team_member::TeamMemberError,
        user::UserError,
    },
};
use services::services::{
    attachment::AttachmentServiceError, auth::AuthError, password::PasswordError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Role(#[from] RoleError),
    #[error(transparent)]
    Release(#[from] ReleaseError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    TeamMember(#[from] TeamMemberError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Comment(#[from] CommentError),
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<AttachmentServiceError> for ApiError {
    fn from(err: AttachmentServiceError) -> Self {
        match err {
            AttachmentServiceError::Attachment(inner) => ApiError::Attachment(inner),
            AttachmentServiceError::Database(db_err) => ApiError::Database(db_err),
            AttachmentServiceError::Io(io_err) => ApiError::Io(io_err),
            AttachmentServiceError::NotFound => {
                ApiError::NotFound("Attachment not found".to_string())
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_type) = match &self {
            ApiError::User(err) => match err {
                UserError::NotFound => (StatusCode::NOT_FOUND, "UserError"),
                UserError::DuplicateName | UserError::DuplicateEmail => {
                    (StatusCode::CONFLICT, "UserError")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "UserError"),
            },
            ApiError::Role(err) => match err {
                RoleError::NotFound => (StatusCode::NOT_FOUND, "RoleError"),
                RoleError::DuplicateName => (StatusCode::CONFLICT, "RoleError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "RoleError"),
            },
            ApiError::Release(err) => match err {
                ReleaseError::NotFound => (StatusCode::NOT_FOUND, "ReleaseError"),
                ReleaseError::DuplicateName => (StatusCode::CONFLICT, "ReleaseError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "ReleaseError"),
            },
            ApiError::Project(err) => match err {
                ProjectError::NotFound => (StatusCode::NOT_FOUND, "ProjectError"),
                ProjectError::DuplicateName => (StatusCode::CONFLICT, "ProjectError"),
                ProjectError::ReleaseNotFound => (StatusCode::BAD_REQUEST, "ProjectError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "ProjectError"),
            },
            ApiError::TeamMember(err) => match err {
                TeamMemberError::NotFound => (StatusCode::NOT_FOUND, "TeamMemberError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "TeamMemberError"),
            },
            ApiError::Task(err) => match err {
                TaskError::NotFound => (StatusCode::NOT_FOUND, "TaskError"),
                TaskError::DuplicateName => (StatusCode::CONFLICT, "TaskError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "TaskError"),
            },
            ApiError::Comment(err) => match err {
                CommentError::NotFound => (StatusCode::NOT_FOUND, "CommentError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "CommentError"),
            },
            ApiError::Attachment(err) => match err {
                AttachmentError::NotFound => (StatusCode::NOT_FOUND, "AttachmentError"),
                AttachmentError::DuplicateName => (StatusCode::CONFLICT, "AttachmentError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "AttachmentError"),
            },
            ApiError::Auth(err) => match err {
                AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "AuthError"),
                AuthError::Forbidden => (StatusCode::FORBIDDEN, "AuthError"),
                AuthError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "AuthError"),
            },
            ApiError::Database(db_err) => match db_err {
                DbErr::RecordNotFound(_) => (StatusCode::NOT_FOUND, "DatabaseError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError"),
            },
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IoError"),
            ApiError::Multipart(_) => (StatusCode::BAD_REQUEST, "MultipartError"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "ForbiddenError"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "ConflictError"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
        };

        let error_message = match &self {
            ApiError::Multipart(_) => {
                "Failed to upload file. Please ensure the file is valid and try again.".to_string()
            }
            ApiError::Unauthorized => "Unauthorized. Please sign in again.".to_string(),
            ApiError::Auth(AuthError::Unauthorized) => {
                "Unauthorized. Please sign in again.".to_string()
            }
            ApiError::Forbidden(msg) => msg.clone(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::Conflict(msg) => msg.clone(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Internal(msg) => msg.clone(),
            _ => format!("{}: {}", error_type, self),
        };

        if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error_type,
                error = %self,
                "API request failed"
            );
        }
        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_maps_to_expected_http_statuses() {
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("nope".to_string())
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("missing".to_string())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("conflict".to_string())
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::BadRequest("bad".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("boom".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn domain_errors_map_to_expected_http_statuses() {
        assert_eq!(
            ApiError::from(UserError::DuplicateEmail)
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(TaskError::NotFound).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(TaskError::DuplicateName)
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(ProjectError::ReleaseNotFound)
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AuthError::Forbidden).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AuthError::Unauthorized)
                .into_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(DbErr::RecordNotFound("tasks".to_string()))
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
    }
}
