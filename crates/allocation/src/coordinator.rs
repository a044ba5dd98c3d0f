//! Allocation transaction coordinator.
//!
//! ```text
//! allocate(complaint, allocator, bundle)
//!   ↓
//! 1. Claim the complaint (one allocation per complaint at a time, bounded retries)
//!   ↓
//! 2. Validate against current complaint + inventory state (no mutation)
//!   ↓
//! 3. Apply inventory mutations in resource-id order (atomic per resource)
//!   ↓
//! 4. Conditionally move the complaint under_review → assigned
//!   ↓
//! 5. Append the ledger record
//!   ↓
//! 6. Publish AllocationCommitted (best effort)
//! ```
//!
//! A failure in steps 3–5 compensates every mutation already applied, in reverse order,
//! before the error is returned. Publication happens only after the ledger append and
//! its failure does not undo anything.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use roadworks_complaints::{
    AssignedLine, AssignedResources, Complaint, ComplaintRepository, ComplaintStatus,
    PendingRequest, ResourceCategory,
};
use roadworks_core::{ComplaintId, ResourceId, UserId};
use roadworks_events::{EventBus, EventEnvelope};
use roadworks_inventory::{InventoryError, ResourceInventory, ResourceKind};

use crate::bundle::{AllocationBundle, PlannedLine};
use crate::config::CoordinatorConfig;
use crate::error::AllocationError;
use crate::events::AllocationCommitted;
use crate::ledger::{AllocationLedger, AllocationRecord, LedgerEntry};

/// A validated line, ready to be applied.
#[derive(Debug, Clone)]
struct Reservation {
    line: PlannedLine,
    name: String,
    kind: ResourceKind,
}

impl Reservation {
    fn resource_id(&self) -> ResourceId {
        self.line.resource_id
    }

    /// Materials and personnel draw down quantity; machines flip availability.
    fn draws_quantity(&self) -> bool {
        self.kind.is_quantity_tracked()
    }
}

/// Releases the complaint claim on drop.
struct Claim<'a> {
    in_flight: &'a Mutex<HashSet<ComplaintId>>,
    complaint_id: ComplaintId,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.complaint_id);
    }
}

/// Runs allocations against injected complaint, inventory, ledger and bus implementations.
///
/// - `C`: complaint store ([`ComplaintRepository`])
/// - `I`: resource inventory ([`ResourceInventory`])
/// - `L`: allocation ledger ([`AllocationLedger`])
/// - `B`: event bus for [`AllocationCommitted`] envelopes
///
/// Allocations for different complaints run in parallel; they only serialize on the
/// individual resources they share (inside the inventory).
#[derive(Debug)]
pub struct AllocationCoordinator<C, I, L, B> {
    complaints: C,
    inventory: I,
    ledger: L,
    bus: B,
    config: CoordinatorConfig,
    in_flight: Mutex<HashSet<ComplaintId>>,
}

impl<C, I, L, B> AllocationCoordinator<C, I, L, B> {
    pub fn new(complaints: C, inventory: I, ledger: L, bus: B) -> Self {
        Self {
            complaints,
            inventory,
            ledger,
            bus,
            config: CoordinatorConfig::default(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn complaints(&self) -> &C {
        &self.complaints
    }

    pub fn inventory(&self) -> &I {
        &self.inventory
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Take exclusive ownership of `complaint_id` for the duration of one allocation.
    fn claim(&self, complaint_id: ComplaintId) -> Result<Claim<'_>, AllocationError> {
        let attempts = self.config.attempts();
        for attempt in 0..attempts {
            let claimed = self
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(complaint_id);
            if claimed {
                return Ok(Claim {
                    in_flight: &self.in_flight,
                    complaint_id,
                });
            }
            if attempt + 1 < attempts {
                let delay = self.config.delay_for_attempt(attempt);
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "complaint busy, retrying claim"
                );
                std::thread::sleep(delay);
            }
        }

        tracing::warn!(
            attempts,
            "gave up waiting for concurrent allocation of the same complaint"
        );
        Err(AllocationError::ConcurrencyConflict(complaint_id))
    }
}

impl<C, I, L, B> AllocationCoordinator<C, I, L, B>
where
    C: ComplaintRepository,
    I: ResourceInventory,
    L: AllocationLedger,
    B: EventBus<EventEnvelope<AllocationCommitted>>,
{
    /// Commit `bundle` to `complaint_id` on behalf of `allocated_by`.
    ///
    /// Either every effect happens (inventory drawn down, complaint `assigned` with the
    /// snapshot, one ledger record) or none does.
    pub fn allocate(
        &self,
        complaint_id: ComplaintId,
        allocated_by: UserId,
        bundle: &AllocationBundle,
    ) -> Result<AllocationRecord, AllocationError> {
        let span = tracing::info_span!(
            "allocate",
            complaint_id = %complaint_id,
            allocated_by = %allocated_by
        );
        let _entered = span.enter();

        let result = self.claim(complaint_id).and_then(|_claim| {
            self.allocate_claimed(complaint_id, allocated_by, bundle)
        });

        match &result {
            Ok(record) => tracing::info!(allocation_id = %record.id, "allocation committed"),
            Err(err) => tracing::info!(error = err.code(), reason = %err, "allocation rejected"),
        }
        result
    }

    /// Complaints currently asking for resources, most urgent first.
    pub fn pending_requests(&self) -> Result<Vec<PendingRequest>, AllocationError> {
        let complaints = self.complaints.list()?;
        Ok(roadworks_complaints::pending_requests(&complaints))
    }

    pub fn ledger_for_complaint(
        &self,
        complaint_id: ComplaintId,
    ) -> Result<Option<AllocationRecord>, AllocationError> {
        Ok(self.ledger.get_by_complaint(complaint_id)?)
    }

    pub fn allocations(&self) -> Result<Vec<AllocationRecord>, AllocationError> {
        Ok(self.ledger.list_all()?)
    }

    fn allocate_claimed(
        &self,
        complaint_id: ComplaintId,
        allocated_by: UserId,
        bundle: &AllocationBundle,
    ) -> Result<AllocationRecord, AllocationError> {
        let complaint = self.complaints.get(complaint_id)?;
        if complaint.status() != ComplaintStatus::UnderReview {
            return Err(AllocationError::InvalidState {
                complaint_id,
                status: Some(complaint.status()),
            });
        }

        let reservations = self.validate(&complaint, bundle)?;
        let snapshot = snapshot_of(&reservations);
        let allocated_at = Utc::now();

        let applied = self.apply(&reservations)?;

        let assigned = match self.complaints.transition_to_assigned(
            complaint_id,
            snapshot.clone(),
            allocated_by,
            allocated_at,
        ) {
            Ok(c) => c,
            Err(err) => {
                self.rollback(&applied);
                return Err(err.into());
            }
        };

        let record = match self.ledger.append(LedgerEntry {
            complaint_id,
            resources: snapshot,
            allocated_by,
            allocated_at,
        }) {
            Ok(record) => record,
            Err(err) => {
                if let Err(revert) = self
                    .complaints
                    .revert_assignment(complaint_id, assigned.version())
                {
                    tracing::error!(error = %revert, "failed to revert complaint assignment");
                }
                self.rollback(&applied);
                return Err(err.into());
            }
        };

        self.publish(&record);
        Ok(record)
    }

    fn validate(
        &self,
        complaint: &Complaint,
        bundle: &AllocationBundle,
    ) -> Result<Vec<Reservation>, AllocationError> {
        if bundle.is_empty() {
            return Err(AllocationError::Validation(
                "allocation bundle contains no resources".to_string(),
            ));
        }

        // Per line, before merging could fold an empty line into a real one.
        if let Some(empty) = bundle.zero_quantity_line() {
            let resource = self.inventory.get(empty.resource_id)?;
            return Err(AllocationError::InsufficientQuantity {
                resource_id: empty.resource_id,
                name: resource.name().to_string(),
                requested: 0,
                available: resource.quantity(),
            });
        }

        let lines = bundle.planned_lines()?;
        let mut reservations = Vec::with_capacity(lines.len());

        for line in lines {
            let resource = self.inventory.get(line.resource_id)?;

            let expected_kind = kind_for(line.category);
            if resource.kind() != expected_kind {
                return Err(AllocationError::CategoryMismatch {
                    resource_id: line.resource_id,
                    category: line.category,
                    kind: resource.kind(),
                });
            }

            if !resource.kind().is_quantity_tracked() {
                if !resource.is_available() {
                    return Err(AllocationError::MachineUnavailable {
                        resource_id: line.resource_id,
                        name: resource.name().to_string(),
                    });
                }
            } else if line.quantity == 0 || line.quantity > resource.quantity() {
                return Err(AllocationError::InsufficientQuantity {
                    resource_id: line.resource_id,
                    name: resource.name().to_string(),
                    requested: line.quantity,
                    available: resource.quantity(),
                });
            }

            reservations.push(Reservation {
                line,
                name: resource.name().to_string(),
                kind: resource.kind(),
            });
        }

        for category in complaint.estimates().requested_categories() {
            if !bundle.supplies(category) && !bundle.acknowledges(category) {
                return Err(AllocationError::IncompleteAllocation(category));
            }
        }

        Ok(reservations)
    }

    /// Apply every reservation or none of them.
    fn apply<'a>(
        &self,
        reservations: &'a [Reservation],
    ) -> Result<Vec<&'a Reservation>, AllocationError> {
        let mut order: Vec<&Reservation> = reservations.iter().collect();
        order.sort_by_key(|r| r.resource_id());

        let mut applied = Vec::with_capacity(order.len());
        for reservation in order {
            let outcome = if reservation.draws_quantity() {
                self.inventory
                    .try_deduct(reservation.resource_id(), reservation.line.quantity)
            } else {
                self.inventory.try_set_unavailable(reservation.resource_id())
            };

            if let Err(err) = outcome {
                self.rollback(&applied);
                return Err(commit_error(reservation, err));
            }
            applied.push(reservation);
        }
        Ok(applied)
    }

    fn rollback(&self, applied: &[&Reservation]) {
        if applied.is_empty() {
            return;
        }
        for reservation in applied.iter().rev() {
            let outcome = if reservation.draws_quantity() {
                self.inventory
                    .credit(reservation.resource_id(), reservation.line.quantity)
            } else {
                self.inventory.mark_available(reservation.resource_id())
            };
            if let Err(err) = outcome {
                tracing::error!(
                    resource_id = %reservation.resource_id(),
                    error = %err,
                    "failed to roll back inventory mutation"
                );
            }
        }
        tracing::warn!(reverted = applied.len(), "allocation rolled back");
    }

    fn publish(&self, record: &AllocationRecord) {
        let envelope = EventEnvelope::seal(AllocationCommitted::from(record));
        if let Err(err) = self.bus.publish(envelope) {
            tracing::warn!(
                allocation_id = %record.id,
                error = ?err,
                "failed to publish allocation event"
            );
        }
    }
}

fn kind_for(category: ResourceCategory) -> ResourceKind {
    match category {
        ResourceCategory::Materials => ResourceKind::Material,
        ResourceCategory::Machines => ResourceKind::Machine,
        ResourceCategory::Personnel => ResourceKind::Personnel,
    }
}

/// Map an inventory refusal during commit (another allocation got there first).
fn commit_error(reservation: &Reservation, err: InventoryError) -> AllocationError {
    match err {
        InventoryError::InsufficientQuantity {
            resource_id,
            requested,
            available,
        } => AllocationError::InsufficientQuantity {
            resource_id,
            name: reservation.name.clone(),
            requested,
            available,
        },
        InventoryError::AlreadyUnavailable(resource_id) => AllocationError::MachineUnavailable {
            resource_id,
            name: reservation.name.clone(),
        },
        other => other.into(),
    }
}

fn snapshot_of(reservations: &[Reservation]) -> AssignedResources {
    let mut snapshot = AssignedResources::default();
    for r in reservations {
        let line = AssignedLine {
            resource_id: r.line.resource_id,
            name: r.name.clone(),
            quantity: r.line.quantity,
            unit: r.line.unit.clone(),
        };
        match r.line.category {
            ResourceCategory::Materials => snapshot.materials.push(line),
            ResourceCategory::Machines => snapshot.machines.push(line),
            ResourceCategory::Personnel => snapshot.personnel.push(line),
        }
    }
    snapshot
}
