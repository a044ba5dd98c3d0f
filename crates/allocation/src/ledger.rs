//! Append-only allocation history.
//!
//! Records are immutable and permanent: the ledger has no update, delete or reversal.
//! At most one record exists per complaint.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use roadworks_complaints::AssignedResources;
use roadworks_core::{AllocationId, ComplaintId, ResourceId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("complaint {0} already has an allocation record")]
    DuplicateComplaint(ComplaintId),

    #[error("allocation ledger lock poisoned")]
    Poisoned,
}

/// Input to [`AllocationLedger::append`]; the ledger assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub complaint_id: ComplaintId,
    pub resources: AssignedResources,
    pub allocated_by: UserId,
    pub allocated_at: DateTime<Utc>,
}

/// A committed allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub id: AllocationId,
    pub complaint_id: ComplaintId,
    #[serde(flatten)]
    pub resources: AssignedResources,
    pub allocated_by: UserId,
    pub allocated_at: DateTime<Utc>,
}

impl AllocationRecord {
    /// Quantity this record drew down from `resource_id`.
    pub fn deducted_from(&self, resource_id: ResourceId) -> u64 {
        self.resources.deducted_quantity_of(resource_id)
    }
}

pub trait AllocationLedger: Send + Sync {
    fn append(&self, entry: LedgerEntry) -> Result<AllocationRecord, LedgerError>;

    fn get_by_complaint(
        &self,
        complaint_id: ComplaintId,
    ) -> Result<Option<AllocationRecord>, LedgerError>;

    /// Every record, in id order.
    fn list_all(&self) -> Result<Vec<AllocationRecord>, LedgerError>;
}

impl<S> AllocationLedger for Arc<S>
where
    S: AllocationLedger + ?Sized,
{
    fn append(&self, entry: LedgerEntry) -> Result<AllocationRecord, LedgerError> {
        (**self).append(entry)
    }

    fn get_by_complaint(
        &self,
        complaint_id: ComplaintId,
    ) -> Result<Option<AllocationRecord>, LedgerError> {
        (**self).get_by_complaint(complaint_id)
    }

    fn list_all(&self) -> Result<Vec<AllocationRecord>, LedgerError> {
        (**self).list_all()
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    records: Vec<AllocationRecord>,
    by_complaint: HashMap<ComplaintId, usize>,
}

/// In-memory ledger. Ids start at 1 and increase by one per append.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AllocationLedger for InMemoryLedger {
    fn append(&self, entry: LedgerEntry) -> Result<AllocationRecord, LedgerError> {
        let mut state = self.state.write().map_err(|_| LedgerError::Poisoned)?;

        if state.by_complaint.contains_key(&entry.complaint_id) {
            return Err(LedgerError::DuplicateComplaint(entry.complaint_id));
        }

        let record = AllocationRecord {
            id: AllocationId(state.records.len() as u64 + 1),
            complaint_id: entry.complaint_id,
            resources: entry.resources,
            allocated_by: entry.allocated_by,
            allocated_at: entry.allocated_at,
        };

        let index = state.records.len();
        state.by_complaint.insert(record.complaint_id, index);
        state.records.push(record.clone());
        Ok(record)
    }

    fn get_by_complaint(
        &self,
        complaint_id: ComplaintId,
    ) -> Result<Option<AllocationRecord>, LedgerError> {
        let state = self.state.read().map_err(|_| LedgerError::Poisoned)?;
        Ok(state
            .by_complaint
            .get(&complaint_id)
            .map(|&i| state.records[i].clone()))
    }

    fn list_all(&self) -> Result<Vec<AllocationRecord>, LedgerError> {
        let state = self.state.read().map_err(|_| LedgerError::Poisoned)?;
        Ok(state.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadworks_complaints::AssignedLine;

    fn entry(complaint_id: ComplaintId) -> LedgerEntry {
        LedgerEntry {
            complaint_id,
            resources: AssignedResources::default(),
            allocated_by: UserId::new(),
            allocated_at: Utc::now(),
        }
    }

    #[test]
    fn ids_auto_increment_from_one() {
        let ledger = InMemoryLedger::new();
        let a = ledger.append(entry(ComplaintId::new())).unwrap();
        let b = ledger.append(entry(ComplaintId::new())).unwrap();
        assert_eq!(a.id, AllocationId(1));
        assert_eq!(b.id, AllocationId(2));
        assert_eq!(ledger.list_all().unwrap(), vec![a, b]);
    }

    #[test]
    fn at_most_one_record_per_complaint() {
        let ledger = InMemoryLedger::new();
        let complaint = ComplaintId::new();
        let first = ledger.append(entry(complaint)).unwrap();

        let err = ledger.append(entry(complaint)).unwrap_err();
        assert_eq!(err, LedgerError::DuplicateComplaint(complaint));
        assert_eq!(ledger.get_by_complaint(complaint).unwrap(), Some(first));
        assert_eq!(ledger.list_all().unwrap().len(), 1);
    }

    #[test]
    fn unknown_complaint_has_no_record() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.get_by_complaint(ComplaintId::new()).unwrap(), None);
    }

    #[test]
    fn record_serializes_with_flat_categories() {
        let ledger = InMemoryLedger::new();
        let cement = ResourceId::new();
        let mut e = entry(ComplaintId::new());
        e.resources.materials.push(AssignedLine {
            resource_id: cement,
            name: "Cement".to_string(),
            quantity: 4,
            unit: Some("bags".to_string()),
        });
        let record = ledger.append(e).unwrap();
        assert_eq!(record.deducted_from(cement), 4);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["materials"][0]["quantity"], 4);
        assert!(json["machines"].as_array().unwrap().is_empty());
    }
}
