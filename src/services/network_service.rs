//! Network manager: CRUD for medium-voltage networks scoped to a substation.

use std::sync::Arc;

use super::ServiceError;
use crate::database::models::{Network, NetworkDraft, NetworkPayload};
use crate::database::Store;

#[derive(Clone)]
pub struct NetworkService {
    store: Arc<dyn Store>,
}

impl NetworkService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn find_all(&self) -> Result<Vec<Network>, ServiceError> {
        Ok(self.store.list_networks().await?)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Network, ServiceError> {
        self.store
            .network_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Network not found: {}", id)))
    }

    /// Persist a new network. The owning substation is required, and the code
    /// must be unused within that substation.
    pub async fn save(&self, payload: NetworkPayload) -> Result<Network, ServiceError> {
        payload.validate().map_err(ServiceError::Validation)?;

        let substation_id = payload.substation_id.ok_or_else(|| {
            ServiceError::InvalidState(
                "A network must be linked to a substation before it can be saved".to_string(),
            )
        })?;

        if self
            .store
            .network_by_code_in_substation(&payload.code, substation_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "Network already registered with this code for this substation: {}",
                payload.code
            )));
        }

        Ok(self
            .store
            .insert_network(&NetworkDraft {
                substation_id,
                code: payload.code,
                name: payload.name,
                nominal_voltage: payload.nominal_voltage,
            })
            .await?)
    }

    /// Full replace of the record at `id`: the identifier is forced onto the
    /// input data, with no field-level merge and no code-uniqueness re-check
    /// beyond the store's own constraints.
    pub async fn update(&self, id: i32, payload: NetworkPayload) -> Result<Network, ServiceError> {
        payload.validate().map_err(ServiceError::Validation)?;

        if self.store.network_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Network not found: {}", id)));
        }

        let substation_id = payload.substation_id.ok_or_else(|| {
            ServiceError::InvalidState(
                "A network must be linked to a substation before it can be saved".to_string(),
            )
        })?;

        Ok(self
            .store
            .update_network(
                id,
                &NetworkDraft {
                    substation_id,
                    code: payload.code,
                    name: payload.name,
                    nominal_voltage: payload.nominal_voltage,
                },
            )
            .await?)
    }

    pub async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
        self.store.delete_network(id).await?;
        Ok(())
    }
}
