//! Resource inventory: materials, machines and personnel pools.
//!
//! The store is the only owner of resource quantity/availability. Callers see cloned
//! snapshots and mutate exclusively through the atomic operations on
//! [`ResourceInventory`].

pub mod error;
pub mod resource;
pub mod store;

pub use error::InventoryError;
pub use resource::{Resource, ResourceKind};
pub use store::{InMemoryInventory, NewResource, ResourceInventory};
