//! Complaint domain: lifecycle state machine, complaint store and the derived
//! "pending resource request" view.
//!
//! The allocation engine only ever performs `under_review → assigned`; every other
//! transition is exposed here for the collaborators that own it (triage, supervisors,
//! field work).

pub mod assignment;
pub mod complaint;
pub mod derivation;
pub mod error;
pub mod status;
pub mod store;

pub use assignment::{AssignedLine, AssignedResources, ResourceCategory};
pub use complaint::{Complaint, NewComplaint, Priority, ProblemType, ResourceEstimates, Severity};
pub use derivation::{PendingRequest, pending_requests};
pub use error::ComplaintError;
pub use status::ComplaintStatus;
pub use store::{Assessment, ComplaintRepository, InMemoryComplaintStore};
