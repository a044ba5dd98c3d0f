use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use roadworks_complaints::AssignedResources;
use roadworks_core::{AllocationId, ComplaintId, UserId};
use roadworks_events::Event;

use crate::ledger::AllocationRecord;

/// Published once per committed allocation, after the ledger append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationCommitted {
    pub allocation_id: AllocationId,
    pub complaint_id: ComplaintId,
    pub allocated_by: UserId,
    pub resources: AssignedResources,
    pub allocated_at: DateTime<Utc>,
}

impl From<&AllocationRecord> for AllocationCommitted {
    fn from(record: &AllocationRecord) -> Self {
        Self {
            allocation_id: record.id,
            complaint_id: record.complaint_id,
            allocated_by: record.allocated_by,
            resources: record.resources.clone(),
            allocated_at: record.allocated_at,
        }
    }
}

/// Streamed per complaint; the sequence number is the ledger id.
impl Event for AllocationCommitted {
    const EVENT_TYPE: &'static str = "allocation.committed";
    const STREAM_TYPE: &'static str = "complaint";

    fn stream_id(&self) -> Uuid {
        *self.complaint_id.as_uuid()
    }

    fn sequence_number(&self) -> u64 {
        self.allocation_id.0
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.allocated_at
    }
}
