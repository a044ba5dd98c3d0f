use std::sync::Arc;

use roadworks_allocation::{AllocationCommitted, AllocationCoordinator, InMemoryLedger};
use roadworks_complaints::InMemoryComplaintStore;
use roadworks_events::{EventBus, EventEnvelope, InMemoryEventBus};
use roadworks_inventory::InMemoryInventory;

use crate::config::ApiConfig;

pub type AllocationBus = InMemoryEventBus<EventEnvelope<AllocationCommitted>>;

pub type Coordinator = AllocationCoordinator<
    Arc<InMemoryComplaintStore>,
    Arc<InMemoryInventory>,
    Arc<InMemoryLedger>,
    Arc<AllocationBus>,
>;

/// Shared state handed to every handler.
///
/// The stores are exposed directly for collaborator operations (intake, assessment,
/// resource administration); everything allocation-related goes through `coordinator`.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub inventory: Arc<InMemoryInventory>,
    pub complaints: Arc<InMemoryComplaintStore>,
    pub ledger: Arc<InMemoryLedger>,
    pub bus: Arc<AllocationBus>,
    pub coordinator: Arc<Coordinator>,
}

pub fn build_services(config: &ApiConfig) -> AppServices {
    let inventory = Arc::new(InMemoryInventory::new());
    let complaints = Arc::new(InMemoryComplaintStore::new());
    let ledger = Arc::new(InMemoryLedger::new());
    let bus: Arc<AllocationBus> = Arc::new(InMemoryEventBus::new());

    spawn_allocation_audit_log(&bus);

    let coordinator = Arc::new(
        AllocationCoordinator::new(complaints.clone(), inventory.clone(), ledger.clone(), bus.clone())
            .with_config(config.coordinator.clone()),
    );

    AppServices {
        inventory,
        complaints,
        ledger,
        bus,
        coordinator,
    }
}

/// Background subscriber: one log line per committed allocation.
///
/// Runs on a plain thread; it exits once the bus (and so every sender) is dropped.
fn spawn_allocation_audit_log(bus: &Arc<AllocationBus>) {
    let sub = bus.subscribe();
    let spawned = std::thread::Builder::new()
        .name("allocation-audit".to_string())
        .spawn(move || {
            for envelope in sub.iter() {
                let event = envelope.payload();
                tracing::info!(
                    allocation_id = %event.allocation_id,
                    complaint_id = %event.complaint_id,
                    allocated_by = %event.allocated_by,
                    materials = event.resources.materials.len(),
                    machines = event.resources.machines.len(),
                    personnel = event.resources.personnel.len(),
                    "allocation committed (audit)"
                );
            }
        });

    if let Err(e) = spawned {
        tracing::warn!("failed to start allocation audit log: {e}");
    }
}
