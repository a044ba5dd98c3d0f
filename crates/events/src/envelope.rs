use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::Event;

/// What subscribers actually receive: the payload plus the metadata needed to route
/// it and drop redelivered copies (`stream_id` + `sequence_number`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    event_type: String,
    schema_version: u32,

    stream_id: Uuid,
    stream_type: String,
    sequence_number: u64,

    occurred_at: DateTime<Utc>,
    payload: E,
}

impl<E: Event> EventEnvelope<E> {
    /// Wrap `event`, taking every metadata field from its [`Event`] impl.
    pub fn seal(event: E) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: E::EVENT_TYPE.to_string(),
            schema_version: E::SCHEMA_VERSION,
            stream_id: event.stream_id(),
            stream_type: E::STREAM_TYPE.to_string(),
            sequence_number: event.sequence_number(),
            occurred_at: event.occurred_at(),
            payload: event,
        }
    }
}

impl<E> EventEnvelope<E> {
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn stream_id(&self) -> Uuid {
        self.stream_id
    }

    pub fn stream_type(&self) -> &str {
        &self.stream_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
