use axum::{
    extract::{Request, State},
    http::{Method, header},
    middleware::Next,
    response::Response,
};
use url::form_urlencoded;

use crate::{Deployment, error::ApiError};

fn parse_authorization_bearer(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let (prefix, rest) = trimmed.split_once(' ')?;
    if !prefix.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

// WebSocket clients can't set headers, so `?token=` is accepted as a
// fallback.
fn extract_query_token(req: &Request) -> Option<String> {
    let query = req.uri().query()?;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key == "token" {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return None;
            }
            return Some(trimmed.to_string());
        }
    }
    None
}

fn extract_request_token(req: &Request) -> Option<String> {
    if let Some(value) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_authorization_bearer)
    {
        return Some(value.to_string());
    }
    extract_query_token(req)
}

// This middleware is installed on the nested `/api` router, so paths are
// relative to that prefix (e.g. `/auth` instead of `/api/auth`).
fn is_public(req: &Request) -> bool {
    req.method() == Method::POST && matches!(req.uri().path(), "/auth" | "/users")
}

/// Resolves the bearer token to a [`db::models::user::User`] and attaches
/// it as a request extension. Everything behind `/api` except login and
/// user signup requires a valid identity.
pub async fn require_identity(
    State(deployment): State<Deployment>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_public(&req) {
        return Ok(next.run(req).await);
    }

    let token = extract_request_token(&req).ok_or(ApiError::Unauthorized)?;
    let user = deployment
        .auth()
        .resolve_identity(&deployment.db().pool, &token)
        .await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::parse_authorization_bearer;

    #[test]
    fn bearer_parsing_is_case_insensitive_and_trims() {
        assert_eq!(parse_authorization_bearer("Bearer abc"), Some("abc"));
        assert_eq!(parse_authorization_bearer("bearer  abc "), Some("abc"));
        assert_eq!(parse_authorization_bearer("Basic abc"), None);
        assert_eq!(parse_authorization_bearer("Bearer "), None);
        assert_eq!(parse_authorization_bearer(""), None);
    }
}
