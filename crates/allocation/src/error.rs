use thiserror::Error;

use roadworks_complaints::{ComplaintError, ComplaintStatus, ResourceCategory};
use roadworks_core::{ComplaintId, ResourceId};
use roadworks_inventory::{InventoryError, ResourceKind};

use crate::ledger::LedgerError;

/// Why an allocation was refused. Every variant leaves complaint, inventory and ledger
/// exactly as they were before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// The complaint is not `under_review` (`status` is `None` when it does not exist).
    #[error("{}", invalid_state_message(.complaint_id, .status))]
    InvalidState {
        complaint_id: ComplaintId,
        status: Option<ComplaintStatus>,
    },

    #[error("resource {0} not found")]
    ResourceNotFound(ResourceId),

    #[error("Not enough quantity for {name}. Requested {requested}, available {available}")]
    InsufficientQuantity {
        resource_id: ResourceId,
        name: String,
        requested: u64,
        available: u64,
    },

    #[error("machine {name} is not available")]
    MachineUnavailable { resource_id: ResourceId, name: String },

    /// The request names this category but the bundle supplies nothing for it and the
    /// omission was not acknowledged.
    #[error("the request asks for {0} but none were allocated")]
    IncompleteAllocation(ResourceCategory),

    #[error("resource {resource_id} is a {kind} and cannot be allocated as {category}")]
    CategoryMismatch {
        resource_id: ResourceId,
        category: ResourceCategory,
        kind: ResourceKind,
    },

    /// Another allocation for the same complaint held it for the whole retry window.
    #[error("complaint {0} is being allocated concurrently; retry later")]
    ConcurrencyConflict(ComplaintId),

    #[error("invalid allocation request: {0}")]
    Validation(String),

    #[error("store failure: {0}")]
    Store(String),
}

fn invalid_state_message(id: &ComplaintId, status: &Option<ComplaintStatus>) -> String {
    match status {
        Some(status) => format!("complaint {id} is {status}; resources can only be allocated to complaints under review"),
        None => format!("complaint {id} not found"),
    }
}

impl AllocationError {
    /// Stable machine-readable code, used by the HTTP boundary and in logs.
    pub fn code(&self) -> &'static str {
        match self {
            AllocationError::InvalidState { status: None, .. } => "complaint_not_found",
            AllocationError::InvalidState { .. } => "invalid_state",
            AllocationError::ResourceNotFound(_) => "resource_not_found",
            AllocationError::InsufficientQuantity { .. } => "insufficient_quantity",
            AllocationError::MachineUnavailable { .. } => "machine_unavailable",
            AllocationError::IncompleteAllocation(_) => "incomplete_allocation",
            AllocationError::CategoryMismatch { .. } => "category_mismatch",
            AllocationError::ConcurrencyConflict(_) => "concurrency_conflict",
            AllocationError::Validation(_) => "validation_error",
            AllocationError::Store(_) => "store_error",
        }
    }
}

impl From<InventoryError> for AllocationError {
    fn from(value: InventoryError) -> Self {
        match value {
            InventoryError::NotFound(id) => AllocationError::ResourceNotFound(id),
            InventoryError::Domain(e) => AllocationError::Validation(e.to_string()),
            other => AllocationError::Store(other.to_string()),
        }
    }
}

impl From<ComplaintError> for AllocationError {
    fn from(value: ComplaintError) -> Self {
        match value {
            ComplaintError::NotFound(id) => AllocationError::InvalidState {
                complaint_id: id,
                status: None,
            },
            ComplaintError::StatusMismatch { id, actual, .. } => AllocationError::InvalidState {
                complaint_id: id,
                status: Some(actual),
            },
            other => AllocationError::Store(other.to_string()),
        }
    }
}

impl From<LedgerError> for AllocationError {
    fn from(value: LedgerError) -> Self {
        AllocationError::Store(value.to_string())
    }
}
