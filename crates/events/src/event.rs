use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A fact that has already been committed somewhere durable.
///
/// The constants describe the event kind; the methods locate one instance in its
/// stream. [`crate::EventEnvelope::seal`] reads both.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name, e.g. `allocation.committed`.
    const EVENT_TYPE: &'static str;

    /// Kind of entity the stream belongs to, e.g. `complaint`.
    const STREAM_TYPE: &'static str;

    /// Bumped when the payload shape changes.
    const SCHEMA_VERSION: u32 = 1;

    fn stream_id(&self) -> Uuid;

    /// Position of the committed record this event describes.
    fn sequence_number(&self) -> u64;

    fn occurred_at(&self) -> DateTime<Utc>;
}
