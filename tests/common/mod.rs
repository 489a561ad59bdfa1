use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use gridref_api::database::memory::MemStore;
use gridref_api::{app, AppState};

/// Fresh in-process application over an empty in-memory store.
pub fn test_app() -> Router {
    app(AppState::new(Arc::new(MemStore::new())))
}

/// Drive one request through the router and decode the JSON body (Null when
/// the body is empty).
pub async fn send(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&value)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

/// Log in with the development credential pair and return the bearer token.
pub async fn login(app: &Router) -> Result<String> {
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "admin", "password": "1234" })),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::OK, "login failed: {} {}", status, body);
    let token = body["token"].as_str().unwrap_or_default().to_string();
    anyhow::ensure!(!token.is_empty(), "empty token in login response");
    Ok(token)
}

/// Substation payload with the given code and nested network codes.
pub fn substation_payload(code: &str, network_codes: &[&str]) -> Value {
    json!({
        "code": code,
        "name": format!("Substation {}", code),
        "latitude": "-23.5616840",
        "longitude": "-46.6559810",
        "networks": network_codes
            .iter()
            .map(|c| json!({ "code": c, "name": format!("Feeder {}", c), "nominal_voltage": "13.8" }))
            .collect::<Vec<_>>(),
    })
}
