//! In-memory store backend. Backs development runs without a database and the
//! test suite. Enforces the same unique and referential constraints as the
//! Postgres schema. Composite substation operations stage their writes on a
//! copy of the state and commit only when every step lands, so a failing plan
//! leaves nothing behind.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::{Network, NetworkDraft, Substation, SubstationDraft, SubstationRecord};
use super::{NetworkPlan, Store, StoreError};

#[derive(Default, Clone)]
struct MemInner {
    substations: BTreeMap<i32, SubstationRecord>,
    networks: BTreeMap<i32, Network>,
    next_substation_id: i32,
    next_network_id: i32,
}

impl MemInner {
    fn next_substation_id(&mut self) -> i32 {
        self.next_substation_id += 1;
        self.next_substation_id
    }

    fn next_network_id(&mut self) -> i32 {
        self.next_network_id += 1;
        self.next_network_id
    }

    fn assemble(&self, record: &SubstationRecord) -> Substation {
        let networks = self
            .networks
            .values()
            .filter(|n| n.substation_id == record.id)
            .cloned()
            .collect();
        Substation::from_record(record.clone(), networks)
    }

    fn network_code_taken(&self, code: &str, ignore_id: Option<i32>) -> bool {
        self.networks
            .values()
            .any(|n| n.code == code && Some(n.id) != ignore_id)
    }

    fn substation_code_taken(&self, code: &str, ignore_id: Option<i32>) -> bool {
        self.substations
            .values()
            .any(|s| s.code == code && Some(s.id) != ignore_id)
    }

    fn apply_plan(&mut self, substation_id: i32, plan: &[NetworkPlan]) -> Result<(), StoreError> {
        for step in plan {
            match step {
                NetworkPlan::Adopt { id } => {
                    let network = self.networks.get_mut(id).ok_or_else(|| {
                        StoreError::NotFound(format!("network {} no longer exists", id))
                    })?;
                    network.substation_id = substation_id;
                }
                NetworkPlan::Create {
                    code,
                    name,
                    nominal_voltage,
                } => {
                    if self.network_code_taken(code, None) {
                        return Err(StoreError::UniqueViolation(format!(
                            "network code '{}' already exists",
                            code
                        )));
                    }
                    let id = self.next_network_id();
                    self.networks.insert(
                        id,
                        Network {
                            id,
                            substation_id,
                            code: code.clone(),
                            name: name.clone(),
                            nominal_voltage: *nominal_voltage,
                        },
                    );
                }
            }
        }
        Ok(())
    }
}

pub struct MemStore {
    inner: RwLock<MemInner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemInner::default()),
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn list_substations(&self) -> Result<Vec<Substation>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.substations.values().map(|r| inner.assemble(r)).collect())
    }

    async fn substation_by_id(&self, id: i32) -> Result<Option<Substation>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.substations.get(&id).map(|r| inner.assemble(r)))
    }

    async fn substation_code_exists(&self, code: &str) -> Result<bool, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.substation_code_taken(code, None))
    }

    async fn create_substation(
        &self,
        draft: &SubstationDraft,
        plan: &[NetworkPlan],
    ) -> Result<Substation, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.substation_code_taken(&draft.code, None) {
            return Err(StoreError::UniqueViolation(format!(
                "substation code '{}' already exists",
                draft.code
            )));
        }

        // Stage on a copy; the swap below is the commit point.
        let mut staged = inner.clone();
        let id = staged.next_substation_id();
        let record = SubstationRecord {
            id,
            code: draft.code.clone(),
            name: draft.name.clone(),
            latitude: draft.latitude,
            longitude: draft.longitude,
        };
        staged.substations.insert(id, record);
        staged.apply_plan(id, plan)?;

        let record = staged.substations.get(&id).cloned().expect("just inserted");
        let substation = staged.assemble(&record);
        *inner = staged;
        Ok(substation)
    }

    async fn update_substation(
        &self,
        id: i32,
        draft: &SubstationDraft,
        plan: &[NetworkPlan],
    ) -> Result<Substation, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.substations.contains_key(&id) {
            return Err(StoreError::NotFound(format!("substation {} not found", id)));
        }
        if inner.substation_code_taken(&draft.code, Some(id)) {
            return Err(StoreError::UniqueViolation(format!(
                "substation code '{}' already exists",
                draft.code
            )));
        }

        let mut staged = inner.clone();
        {
            let record = staged.substations.get_mut(&id).expect("checked above");
            record.code = draft.code.clone();
            record.name = draft.name.clone();
            record.latitude = draft.latitude;
            record.longitude = draft.longitude;
        }
        staged.apply_plan(id, plan)?;

        let record = staged.substations.get(&id).cloned().expect("checked above");
        let substation = staged.assemble(&record);
        *inner = staged;
        Ok(substation)
    }

    async fn delete_substation(&self, id: i32) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.networks.values().any(|n| n.substation_id == id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "substation {} is still referenced by networks",
                id
            )));
        }
        inner.substations.remove(&id);
        Ok(())
    }

    async fn list_networks(&self) -> Result<Vec<Network>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.networks.values().cloned().collect())
    }

    async fn network_by_id(&self, id: i32) -> Result<Option<Network>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.networks.get(&id).cloned())
    }

    async fn network_by_code(&self, code: &str) -> Result<Option<Network>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.networks.values().find(|n| n.code == code).cloned())
    }

    async fn network_by_code_in_substation(
        &self,
        code: &str,
        substation_id: i32,
    ) -> Result<Option<Network>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .networks
            .values()
            .find(|n| n.code == code && n.substation_id == substation_id)
            .cloned())
    }

    async fn insert_network(&self, draft: &NetworkDraft) -> Result<Network, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.substations.contains_key(&draft.substation_id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "substation {} does not exist",
                draft.substation_id
            )));
        }
        if inner.network_code_taken(&draft.code, None) {
            return Err(StoreError::UniqueViolation(format!(
                "network code '{}' already exists",
                draft.code
            )));
        }

        let id = inner.next_network_id();
        let network = Network {
            id,
            substation_id: draft.substation_id,
            code: draft.code.clone(),
            name: draft.name.clone(),
            nominal_voltage: draft.nominal_voltage,
        };
        inner.networks.insert(id, network.clone());
        Ok(network)
    }

    async fn update_network(&self, id: i32, draft: &NetworkDraft) -> Result<Network, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.networks.contains_key(&id) {
            return Err(StoreError::NotFound(format!("network {} not found", id)));
        }
        if !inner.substations.contains_key(&draft.substation_id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "substation {} does not exist",
                draft.substation_id
            )));
        }
        if inner.network_code_taken(&draft.code, Some(id)) {
            return Err(StoreError::UniqueViolation(format!(
                "network code '{}' already exists",
                draft.code
            )));
        }

        let network = Network {
            id,
            substation_id: draft.substation_id,
            code: draft.code.clone(),
            name: draft.name.clone(),
            nominal_voltage: draft.nominal_voltage,
        };
        inner.networks.insert(id, network.clone());
        Ok(network)
    }

    async fn delete_network(&self, id: i32) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.networks.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn draft(code: &str) -> SubstationDraft {
        SubstationDraft {
            code: code.to_string(),
            name: format!("Substation {}", code),
            latitude: Decimal::from(-23),
            longitude: Decimal::from(-46),
        }
    }

    fn network_draft(code: &str, substation_id: i32) -> NetworkDraft {
        NetworkDraft {
            substation_id,
            code: code.to_string(),
            name: None,
            nominal_voltage: None,
        }
    }

    #[tokio::test]
    async fn enforces_substation_code_uniqueness() {
        let store = MemStore::new();
        store.create_substation(&draft("SP1"), &[]).await.unwrap();
        let err = store.create_substation(&draft("SP1"), &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn update_is_constrained_by_other_codes() {
        let store = MemStore::new();
        store.create_substation(&draft("SP1"), &[]).await.unwrap();
        let second = store.create_substation(&draft("SP2"), &[]).await.unwrap();

        let err = store
            .update_substation(second.id, &draft("SP1"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn rejects_network_without_existing_substation() {
        let store = MemStore::new();
        let err = store.insert_network(&network_draft("MT1", 99)).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn delete_is_blocked_by_dependent_networks() {
        let store = MemStore::new();
        let sub = store.create_substation(&draft("SP1"), &[]).await.unwrap();
        store.insert_network(&network_draft("MT1", sub.id)).await.unwrap();

        let err = store.delete_substation(sub.id).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
        assert!(store.substation_by_id(sub.id).await.unwrap().is_some());

        store.delete_network(1).await.unwrap();
        store.delete_substation(sub.id).await.unwrap();
        assert!(store.substation_by_id(sub.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_plan_rolls_back_the_substation_write() {
        let store = MemStore::new();
        let first = store.create_substation(&draft("SP1"), &[]).await.unwrap();
        store.insert_network(&network_draft("MT1", first.id)).await.unwrap();

        let plan = [NetworkPlan::Create {
            code: "MT1".to_string(),
            name: None,
            nominal_voltage: None,
        }];
        let err = store.create_substation(&draft("SP2"), &plan).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));

        // the substation inserted ahead of the failing step is gone too
        assert_eq!(store.list_substations().await.unwrap().len(), 1);
        assert!(!store.substation_code_exists("SP2").await.unwrap());
    }

    #[tokio::test]
    async fn failed_plan_rolls_back_scalar_updates() {
        let store = MemStore::new();
        let target = store.create_substation(&draft("SP1"), &[]).await.unwrap();

        let plan = [NetworkPlan::Adopt { id: 99 }];
        let err = store
            .update_substation(target.id, &draft("SP2"), &plan)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let target = store.substation_by_id(target.id).await.unwrap().unwrap();
        assert_eq!(target.code, "SP1");
    }

    #[tokio::test]
    async fn adopt_reassigns_ownership() {
        let store = MemStore::new();
        let first = store.create_substation(&draft("SP1"), &[]).await.unwrap();
        let network = store.insert_network(&network_draft("MT1", first.id)).await.unwrap();

        let second = store
            .create_substation(&draft("SP2"), &[NetworkPlan::Adopt { id: network.id }])
            .await
            .unwrap();

        assert_eq!(second.networks.len(), 1);
        assert_eq!(second.networks[0].substation_id, second.id);
        let first = store.substation_by_id(first.id).await.unwrap().unwrap();
        assert!(first.networks.is_empty());
    }
}
