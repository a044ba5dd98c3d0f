//! Resource allocation engine.
//!
//! [`AllocationCoordinator::allocate`] validates a requested bundle against the inventory,
//! then commits inventory mutation, the complaint's `under_review → assigned` transition
//! and the ledger entry as one unit, or rolls everything back.
//!
//! ```text
//! claim complaint ─► validate ─► deduct / take machines ─► assign complaint ─► append ledger ─► publish
//!                        │                 │                      │                  │
//!                        └── error         └── rollback ◄─────────┴──────────────────┘
//! ```

pub mod bundle;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod ledger;


pub use bundle::{AllocationBundle, MachineLine, QuantityLine};
pub use config::CoordinatorConfig;
pub use coordinator::AllocationCoordinator;
pub use error::AllocationError;
pub use events::AllocationCommitted;
pub use ledger::{AllocationLedger, AllocationRecord, InMemoryLedger, LedgerEntry, LedgerError};
