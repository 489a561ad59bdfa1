use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth;
use crate::error::ApiError;

/// Authenticated principal extracted from a validated bearer token. Carries
/// no permission set; being present is the whole authorization model.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
}

/// Populates the request's security context. A missing header, a non-Bearer
/// scheme, or an invalid token all let the request proceed unauthenticated;
/// the denial decision belongs to `require_auth` on protected routes.
pub async fn auth_context(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    if let Some(token) = extract_bearer(&headers) {
        if let Some(username) = auth::validate_token(&token) {
            request.extensions_mut().insert(AuthUser { username });
        }
    }
    next.run(request).await
}

/// Rejects requests whose security context was never populated.
pub async fn require_auth(request: Request, next: Next) -> Result<Response, ApiError> {
    if request.extensions().get::<AuthUser>().is_none() {
        return Err(ApiError::unauthorized("Missing or invalid bearer token"));
    }
    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
