use thiserror::Error;

use roadworks_core::{DomainError, ResourceId};

/// Inventory store failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("resource {0} not found")]
    NotFound(ResourceId),

    /// The check half of check-and-decrement failed; nothing was changed.
    #[error("insufficient quantity for resource {resource_id}: requested {requested}, available {available}")]
    InsufficientQuantity {
        resource_id: ResourceId,
        requested: u64,
        available: u64,
    },

    #[error("resource {0} is already unavailable")]
    AlreadyUnavailable(ResourceId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("inventory lock poisoned")]
    Poisoned,
}
