//! Complaint store boundary.
//!
//! [`ComplaintRepository`] is the narrow interface the allocation coordinator uses:
//! read a complaint, conditionally move it to `assigned`, and undo that move inside a
//! failed transaction. The in-memory store additionally exposes the collaborator
//! operations (intake, assessment, resource request, rejection, field-work transitions).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use roadworks_core::{ComplaintId, DomainError, UserId};

use crate::assignment::AssignedResources;
use crate::complaint::{Complaint, NewComplaint, Priority, ResourceEstimates, Severity};
use crate::error::ComplaintError;
use crate::status::ComplaintStatus;

/// Complaint operations consumed by the allocation coordinator.
pub trait ComplaintRepository: Send + Sync {
    fn get(&self, id: ComplaintId) -> Result<Complaint, ComplaintError>;

    /// All complaints, oldest first.
    fn list(&self) -> Result<Vec<Complaint>, ComplaintError>;

    /// Move `under_review → assigned`, storing `snapshot` and stamping actor/time.
    ///
    /// Conditional: fails with `StatusMismatch` unless the complaint is `under_review`
    /// at the moment of the write.
    fn transition_to_assigned(
        &self,
        id: ComplaintId,
        snapshot: AssignedResources,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> Result<Complaint, ComplaintError>;

    /// Undo a `transition_to_assigned` that returned `assigned_version`.
    ///
    /// Only succeeds if nothing else touched the complaint since.
    fn revert_assignment(
        &self,
        id: ComplaintId,
        assigned_version: u64,
    ) -> Result<Complaint, ComplaintError>;
}

impl<S> ComplaintRepository for Arc<S>
where
    S: ComplaintRepository + ?Sized,
{
    fn get(&self, id: ComplaintId) -> Result<Complaint, ComplaintError> {
        (**self).get(id)
    }

    fn list(&self) -> Result<Vec<Complaint>, ComplaintError> {
        (**self).list()
    }

    fn transition_to_assigned(
        &self,
        id: ComplaintId,
        snapshot: AssignedResources,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> Result<Complaint, ComplaintError> {
        (**self).transition_to_assigned(id, snapshot, actor, at)
    }

    fn revert_assignment(
        &self,
        id: ComplaintId,
        assigned_version: u64,
    ) -> Result<Complaint, ComplaintError> {
        (**self).revert_assignment(id, assigned_version)
    }
}

/// Supervisor assessment payload (`pending → under_review`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Assessment {
    #[serde(default)]
    pub estimates: ResourceEstimates,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub estimated_days: Option<u32>,
}

/// In-memory complaint store.
///
/// Every write runs under the map's write lock against a scratch copy that is stored
/// back only if the whole update succeeds, so conditional transitions are atomic.
#[derive(Debug, Default)]
pub struct InMemoryComplaintStore {
    complaints: RwLock<HashMap<ComplaintId, Complaint>>,
}

impl InMemoryComplaintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intake a new complaint in `pending`.
    pub fn insert(&self, new: NewComplaint, at: DateTime<Utc>) -> Result<Complaint, ComplaintError> {
        if new.title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty").into());
        }
        let complaint = Complaint::from_intake(new, at);

        let mut map = self.complaints.write().map_err(|_| ComplaintError::Poisoned)?;
        map.insert(complaint.id, complaint.clone());

        tracing::debug!(complaint_id = %complaint.id, severity = ?complaint.severity, "complaint received");
        Ok(complaint)
    }

    /// Supervisor assessment: `pending → under_review` with estimates and priority.
    pub fn assess(
        &self,
        id: ComplaintId,
        assessment: Assessment,
        at: DateTime<Utc>,
    ) -> Result<Complaint, ComplaintError> {
        self.update(id, |c| {
            c.status.ensure_transition(ComplaintStatus::UnderReview)?;
            c.status = ComplaintStatus::UnderReview;
            c.estimates = assessment.estimates;
            c.priority = assessment.priority.or(c.priority);
            if let Some(severity) = assessment.severity {
                c.severity = severity;
            }
            c.estimated_days = assessment.estimated_days.or(c.estimated_days);
            c.assessed_at = Some(at);
            Ok(())
        })
    }

    /// Supervisor resource request on an `under_review` complaint.
    ///
    /// Sets the explicit request flag; `estimates`, if given, replace the stored ones.
    pub fn request_resources(
        &self,
        id: ComplaintId,
        estimates: Option<ResourceEstimates>,
        at: DateTime<Utc>,
    ) -> Result<Complaint, ComplaintError> {
        self.update(id, |c| {
            expect_status(c, ComplaintStatus::UnderReview)?;
            if let Some(estimates) = estimates {
                c.estimates = estimates;
            }
            c.resource_requested = true;
            c.requested_at = Some(at);
            Ok(())
        })
    }

    /// Administrator rejects the resource request: `under_review → pending`.
    pub fn reject_resource_request(
        &self,
        id: ComplaintId,
        notes: Option<String>,
        _at: DateTime<Utc>,
    ) -> Result<Complaint, ComplaintError> {
        self.update(id, |c| {
            expect_status(c, ComplaintStatus::UnderReview)?;
            c.status = ComplaintStatus::Pending;
            c.resource_requested = false;
            c.requested_at = None;
            c.admin_notes = Some(
                notes
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| "resource request rejected by administrator".to_string()),
            );
            Ok(())
        })
    }

    /// Collaborator-owned transition (triage rejection, field work start/finish).
    ///
    /// Conditional on `expected`; transitions into `assigned` are refused here.
    pub fn transition(
        &self,
        id: ComplaintId,
        expected: ComplaintStatus,
        target: ComplaintStatus,
        at: DateTime<Utc>,
    ) -> Result<Complaint, ComplaintError> {
        if target == ComplaintStatus::Assigned {
            return Err(ComplaintError::ReservedTransition(target));
        }
        self.update(id, |c| {
            expect_status(c, expected)?;
            c.status.ensure_transition(target)?;
            c.status = target;
            if target == ComplaintStatus::Completed {
                c.completed_at = Some(at);
            }
            Ok(())
        })
    }

    fn update(
        &self,
        id: ComplaintId,
        f: impl FnOnce(&mut Complaint) -> Result<(), ComplaintError>,
    ) -> Result<Complaint, ComplaintError> {
        let mut map = self.complaints.write().map_err(|_| ComplaintError::Poisoned)?;
        let current = map.get(&id).ok_or(ComplaintError::NotFound(id))?;

        let mut next = current.clone();
        f(&mut next)?;
        next.version += 1;

        map.insert(id, next.clone());
        Ok(next)
    }
}

fn expect_status(c: &Complaint, expected: ComplaintStatus) -> Result<(), ComplaintError> {
    if c.status != expected {
        return Err(ComplaintError::StatusMismatch {
            id: c.id,
            expected,
            actual: c.status,
        });
    }
    Ok(())
}

impl ComplaintRepository for InMemoryComplaintStore {
    fn get(&self, id: ComplaintId) -> Result<Complaint, ComplaintError> {
        let map = self.complaints.read().map_err(|_| ComplaintError::Poisoned)?;
        map.get(&id).cloned().ok_or(ComplaintError::NotFound(id))
    }

    fn list(&self) -> Result<Vec<Complaint>, ComplaintError> {
        let map = self.complaints.read().map_err(|_| ComplaintError::Poisoned)?;
        let mut out: Vec<Complaint> = map.values().cloned().collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    fn transition_to_assigned(
        &self,
        id: ComplaintId,
        snapshot: AssignedResources,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> Result<Complaint, ComplaintError> {
        self.update(id, |c| {
            expect_status(c, ComplaintStatus::UnderReview)?;
            if c.assigned_resources.is_some() {
                return Err(ComplaintError::AlreadyAssigned(id));
            }
            c.status = ComplaintStatus::Assigned;
            c.assigned_resources = Some(snapshot);
            c.assigned_by = Some(actor);
            c.assigned_at = Some(at);
            Ok(())
        })
    }

    fn revert_assignment(
        &self,
        id: ComplaintId,
        assigned_version: u64,
    ) -> Result<Complaint, ComplaintError> {
        self.update(id, |c| {
            expect_status(c, ComplaintStatus::Assigned)?;
            if c.version != assigned_version {
                return Err(DomainError::conflict(format!(
                    "complaint changed after assignment (expected version {assigned_version}, found {})",
                    c.version
                ))
                .into());
            }
            c.status = ComplaintStatus::UnderReview;
            c.assigned_resources = None;
            c.assigned_by = None;
            c.assigned_at = None;
            Ok(())
        })
    }
}
