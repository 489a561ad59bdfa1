pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use models::{Network, NetworkDraft, Substation, SubstationDraft};

/// Errors surfaced by a store backend. Unique and referential constraint
/// breaches get their own variants: the store is the final arbiter for
/// duplicate codes, and the services translate these into domain outcomes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("referential constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// One step of a substation save/update reconciliation, computed by the
/// substation manager and applied atomically by the store alongside the
/// substation write itself.
#[derive(Debug, Clone)]
pub enum NetworkPlan {
    /// A network with the submitted code already exists somewhere: reassign
    /// its owner to the target substation, keeping its other fields.
    Adopt { id: i32 },
    /// No network with the submitted code exists: create it under the target
    /// substation.
    Create {
        code: String,
        name: Option<String>,
        nominal_voltage: Option<Decimal>,
    },
}

/// Durable record store for substations and networks. Lookups are by integer
/// id or by unique code; composite substation operations apply the network
/// plan in the same atomic unit as the substation write.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_substations(&self) -> Result<Vec<Substation>, StoreError>;
    async fn substation_by_id(&self, id: i32) -> Result<Option<Substation>, StoreError>;
    async fn substation_code_exists(&self, code: &str) -> Result<bool, StoreError>;

    /// Insert a substation and apply the network plan in one atomic unit,
    /// returning the substation with its reconciled network list.
    async fn create_substation(
        &self,
        draft: &SubstationDraft,
        plan: &[NetworkPlan],
    ) -> Result<Substation, StoreError>;

    /// Overwrite a substation's scalar fields and apply the network plan in
    /// one atomic unit.
    async fn update_substation(
        &self,
        id: i32,
        draft: &SubstationDraft,
        plan: &[NetworkPlan],
    ) -> Result<Substation, StoreError>;

    /// Delete by id. A no-op when the id is absent; fails with
    /// `ForeignKeyViolation` when dependent networks still reference it.
    async fn delete_substation(&self, id: i32) -> Result<(), StoreError>;

    async fn list_networks(&self) -> Result<Vec<Network>, StoreError>;
    async fn network_by_id(&self, id: i32) -> Result<Option<Network>, StoreError>;
    /// Global lookup by code, unscoped to any substation.
    async fn network_by_code(&self, code: &str) -> Result<Option<Network>, StoreError>;
    async fn network_by_code_in_substation(
        &self,
        code: &str,
        substation_id: i32,
    ) -> Result<Option<Network>, StoreError>;
    async fn insert_network(&self, draft: &NetworkDraft) -> Result<Network, StoreError>;
    /// Full replace of the record at `id`.
    async fn update_network(&self, id: i32, draft: &NetworkDraft) -> Result<Network, StoreError>;
    /// Delete by id. A no-op when the id is absent.
    async fn delete_network(&self, id: i32) -> Result<(), StoreError>;
}
