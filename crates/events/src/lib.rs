//! Domain events and the publish/subscribe boundary.
//!
//! The allocation core publishes facts here after they are committed; notification and
//! reporting collaborators subscribe. Nothing in this crate is allowed to feed back into
//! an allocation decision.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
