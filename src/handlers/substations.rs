use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::database::models::{Substation, SubstationPayload};
use crate::error::ApiError;
use crate::AppState;

/// GET /subestacoes - list all substations
pub async fn get_all(State(state): State<AppState>) -> Result<Json<Vec<Substation>>, ApiError> {
    Ok(Json(state.substations.find_all().await?))
}

/// GET /subestacoes/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Substation>, ApiError> {
    Ok(Json(state.substations.find_by_id(id).await?))
}

/// POST /subestacoes - create a substation with its nested networks
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<SubstationPayload>,
) -> Result<Json<Substation>, ApiError> {
    let substation = state.substations.save(payload).await?;
    tracing::info!(id = substation.id, code = %substation.code, "created substation");
    Ok(Json(substation))
}

/// PUT /subestacoes/:id - full replace plus network reconciliation
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<SubstationPayload>,
) -> Result<Json<Substation>, ApiError> {
    Ok(Json(state.substations.update(id, payload).await?))
}

/// DELETE /subestacoes/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    state.substations.delete_by_id(id).await?;
    Ok(Json(json!({ "message": "Substation removed" })))
}
