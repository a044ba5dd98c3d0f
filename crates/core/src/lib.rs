//! Shared domain primitives for the roadworks crates.
//!
//! Identifiers and the domain error model used by every other crate. No IO lives here.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{AllocationId, ComplaintId, ResourceId, UserId};
