use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::config;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /auth/login - validate the configured credential pair and issue a
/// bearer token for the protected routes.
pub async fn login(Json(body): Json<LoginRequest>) -> Result<Json<Value>, ApiError> {
    let security = &config::config().security;

    if body.username != security.admin_username || body.password != security.admin_password {
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let token = auth::issue_token(&body.username).map_err(|e| {
        tracing::error!("token issuance failed: {}", e);
        ApiError::internal_server_error("Failed to issue token")
    })?;

    Ok(Json(json!({ "token": token })))
}
