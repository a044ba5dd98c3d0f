//! Publish/subscribe seam between the allocation core and its collaborators.
//!
//! Notification delivery and dashboards hang off a [`Subscription`]. The ledger stays
//! the source of truth; a subscriber that misses a message can rebuild from it.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvError, RecvTimeoutError, TryRecvError};
use std::time::Duration;

/// Receiving end handed out by [`EventBus::subscribe`].
///
/// Sees every message published after it was created. Owned by one consuming thread.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Blocks; errors once the bus is gone.
    pub fn recv(&self) -> Result<M, RecvError> {
        self.receiver.recv()
    }

    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Blocking iterator that ends when the bus is dropped.
    pub fn iter(&self) -> impl Iterator<Item = M> + '_ {
        self.receiver.iter()
    }
}

/// Fan-out of committed facts.
///
/// ```text
/// ledger append ──► EventBus::publish ──► Subscription (one per collaborator)
/// ```
///
/// A failed `publish` never undoes the commit it describes; callers log it and move on.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
