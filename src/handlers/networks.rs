use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::database::models::{Network, NetworkPayload};
use crate::error::ApiError;
use crate::AppState;

/// GET /redesmt - list all medium-voltage networks
pub async fn get_all(State(state): State<AppState>) -> Result<Json<Vec<Network>>, ApiError> {
    Ok(Json(state.networks.find_all().await?))
}

/// GET /redesmt/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Network>, ApiError> {
    Ok(Json(state.networks.find_by_id(id).await?))
}

/// POST /redesmt - create a network under an existing substation
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<NetworkPayload>,
) -> Result<Json<Network>, ApiError> {
    let network = state.networks.save(payload).await?;
    tracing::info!(id = network.id, code = %network.code, "created network");
    Ok(Json(network))
}

/// DELETE /redesmt/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    state.networks.delete_by_id(id).await?;
    Ok(Json(json!({ "message": "Network removed" })))
}
