pub mod network_service;
pub mod substation_service;

pub use network_service::NetworkService;
pub use substation_service::SubstationService;

use thiserror::Error;

use crate::database::StoreError;

/// Domain-level failures raised by the managers. Translated into HTTP status
/// + message at the API boundary; no retries anywhere.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    /// Duplicate unique code.
    #[error("{0}")]
    Conflict(String),

    /// Missing required association.
    #[error("{0}")]
    InvalidState(String),

    /// Referential constraint breach, typically on delete.
    #[error("{0}")]
    Integrity(String),

    #[error("{0}")]
    Validation(String),

    /// Anything uncaught from the store.
    #[error(transparent)]
    Store(StoreError),
}

// The existence pre-checks in the services are best-effort; the store's
// constraints are the final arbiter, so a duplicate-key failure from the
// store becomes the same Conflict outcome as the pre-check.
impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(msg) => ServiceError::Conflict(msg),
            StoreError::ForeignKeyViolation(msg) => ServiceError::Integrity(msg),
            StoreError::NotFound(msg) => ServiceError::NotFound(msg),
            other => ServiceError::Store(other),
        }
    }
}
