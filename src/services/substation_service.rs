//! Substation manager: CRUD plus the reconciliation that synchronizes a
//! substation's nested network list against persisted records.

use std::collections::HashSet;
use std::sync::Arc;

use super::ServiceError;
use crate::database::models::{NetworkPayload, Substation, SubstationPayload};
use crate::database::{NetworkPlan, Store};

#[derive(Clone)]
pub struct SubstationService {
    store: Arc<dyn Store>,
}

impl SubstationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn find_all(&self) -> Result<Vec<Substation>, ServiceError> {
        Ok(self.store.list_substations().await?)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Substation, ServiceError> {
        self.store
            .substation_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Substation not found: {}", id)))
    }

    /// Create a substation together with its nested networks. The substation
    /// is persisted first so the network plan has a valid owner id; the store
    /// applies both in one atomic unit.
    pub async fn save(&self, payload: SubstationPayload) -> Result<Substation, ServiceError> {
        payload.validate().map_err(ServiceError::Validation)?;

        if self.store.substation_code_exists(&payload.code).await? {
            return Err(ServiceError::Conflict(format!(
                "Substation already registered: {}",
                payload.code
            )));
        }

        let plan = self.reconcile_networks(&payload.networks).await?;
        Ok(self.store.create_substation(&payload.draft(), &plan).await?)
    }

    /// Overwrite a substation's scalar fields and reconcile its network list.
    /// The code is not re-checked for uniqueness here; the store's unique
    /// constraint catches collisions.
    pub async fn update(
        &self,
        id: i32,
        payload: SubstationPayload,
    ) -> Result<Substation, ServiceError> {
        payload.validate().map_err(ServiceError::Validation)?;

        if self.store.substation_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Substation not found: {}", id)));
        }

        let plan = self.reconcile_networks(&payload.networks).await?;
        Ok(self.store.update_substation(id, &payload.draft(), &plan).await?)
    }

    pub async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
        self.store.delete_substation(id).await?;
        Ok(())
    }

    /// Match-by-code-or-create: each submitted network is looked up by code
    /// globally, unscoped to any substation. An existing match is adopted
    /// (its owner reassigned, other fields kept); otherwise a new network is
    /// created under the target substation.
    async fn reconcile_networks(
        &self,
        networks: &[NetworkPayload],
    ) -> Result<Vec<NetworkPlan>, ServiceError> {
        let mut plan = Vec::with_capacity(networks.len());
        let mut planned: HashSet<&str> = HashSet::new();
        for network in networks {
            // A code repeated within one submission resolves to the network
            // its first occurrence produced; there is nothing more to apply.
            if !planned.insert(network.code.as_str()) {
                continue;
            }
            match self.store.network_by_code(&network.code).await? {
                Some(existing) => plan.push(NetworkPlan::Adopt { id: existing.id }),
                None => plan.push(NetworkPlan::Create {
                    code: network.code.clone(),
                    name: network.name.clone(),
                    nominal_voltage: network.nominal_voltage,
                }),
            }
        }
        Ok(plan)
    }
}
