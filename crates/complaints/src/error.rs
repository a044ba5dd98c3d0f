use thiserror::Error;

use roadworks_core::{ComplaintId, DomainError};

use crate::status::ComplaintStatus;

/// Complaint store / lifecycle failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComplaintError {
    #[error("complaint {0} not found")]
    NotFound(ComplaintId),

    /// The requested edge is not in the transition table.
    #[error("transition {from} -> {to} is not allowed")]
    InvalidTransition {
        from: ComplaintStatus,
        to: ComplaintStatus,
    },

    /// A conditional write found the complaint in a different state than the caller saw.
    #[error("complaint {id} is {actual}, expected {expected}")]
    StatusMismatch {
        id: ComplaintId,
        expected: ComplaintStatus,
        actual: ComplaintStatus,
    },

    /// Transitions into `assigned` belong to the allocation coordinator.
    #[error("transition to {0} is reserved for resource allocation")]
    ReservedTransition(ComplaintStatus),

    #[error("complaint {0} already carries an assignment snapshot")]
    AlreadyAssigned(ComplaintId),

    #[error("unknown complaint status '{0}'")]
    UnknownStatus(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("complaint store lock poisoned")]
    Poisoned,
}
