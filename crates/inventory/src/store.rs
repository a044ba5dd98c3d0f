//! Resource inventory store boundary.
//!
//! [`ResourceInventory`] is the outbound interface the allocation coordinator consumes.
//! Every operation is linearizable per resource: the in-memory implementation holds one
//! mutex per resource, so concurrent check-and-mutate calls on the same resource are
//! serialized while calls on different resources proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use roadworks_core::{DomainError, ResourceId};

use crate::error::InventoryError;
use crate::resource::{Resource, ResourceKind};

/// Atomic inventory operations.
pub trait ResourceInventory: Send + Sync {
    /// Current snapshot of one resource.
    fn get(&self, id: ResourceId) -> Result<Resource, InventoryError>;

    /// Atomically check `quantity >= amount` and decrement.
    ///
    /// On failure the resource is untouched and the error carries the observed deficit.
    fn try_deduct(&self, id: ResourceId, amount: u64) -> Result<Resource, InventoryError>;

    /// Atomically check `available == true` and flip it to `false`.
    fn try_set_unavailable(&self, id: ResourceId) -> Result<Resource, InventoryError>;

    /// Return previously deducted quantity (compensation for an aborted allocation).
    fn credit(&self, id: ResourceId, amount: u64) -> Result<Resource, InventoryError>;

    /// Flip a machine back to available (compensation for an aborted allocation).
    fn mark_available(&self, id: ResourceId) -> Result<Resource, InventoryError>;
}

impl<S> ResourceInventory for Arc<S>
where
    S: ResourceInventory + ?Sized,
{
    fn get(&self, id: ResourceId) -> Result<Resource, InventoryError> {
        (**self).get(id)
    }

    fn try_deduct(&self, id: ResourceId, amount: u64) -> Result<Resource, InventoryError> {
        (**self).try_deduct(id, amount)
    }

    fn try_set_unavailable(&self, id: ResourceId) -> Result<Resource, InventoryError> {
        (**self).try_set_unavailable(id)
    }

    fn credit(&self, id: ResourceId, amount: u64) -> Result<Resource, InventoryError> {
        (**self).credit(id, amount)
    }

    fn mark_available(&self, id: ResourceId) -> Result<Resource, InventoryError> {
        (**self).mark_available(id)
    }
}

/// Registration input for a new resource.
#[derive(Debug, Clone)]
pub struct NewResource {
    pub name: String,
    pub kind: ResourceKind,
    pub quantity: u64,
    pub available: bool,
}

/// In-memory inventory with per-resource locking.
///
/// The outer `RwLock` only guards the id → slot map (write-locked on registration);
/// all quantity/availability changes take the slot's own mutex.
#[derive(Debug, Default)]
pub struct InMemoryInventory {
    slots: RwLock<HashMap<ResourceId, Arc<Mutex<Resource>>>>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new resource and return its snapshot.
    pub fn register(&self, new: NewResource) -> Result<Resource, InventoryError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("resource name cannot be empty").into());
        }

        let resource = Resource::new(
            ResourceId::new(),
            name.to_string(),
            new.kind,
            new.quantity,
            new.available,
        );

        let mut slots = self.slots.write().map_err(|_| InventoryError::Poisoned)?;
        slots.insert(resource.id(), Arc::new(Mutex::new(resource.clone())));

        tracing::info!(
            resource_id = %resource.id(),
            kind = %resource.kind(),
            quantity = resource.quantity(),
            "resource registered"
        );
        Ok(resource)
    }

    /// All resources, ordered by id (ids are time-ordered, so this is registration order).
    pub fn list(&self) -> Result<Vec<Resource>, InventoryError> {
        let slots: Vec<Arc<Mutex<Resource>>> = {
            let map = self.slots.read().map_err(|_| InventoryError::Poisoned)?;
            map.values().cloned().collect()
        };

        let mut out = slots
            .iter()
            .map(|slot| slot.lock().map(|r| r.clone()).map_err(|_| InventoryError::Poisoned))
            .collect::<Result<Vec<_>, _>>()?;
        out.sort_by_key(|r| r.id());
        Ok(out)
    }

    /// Administrative restock.
    pub fn restock(&self, id: ResourceId, amount: u64) -> Result<Resource, InventoryError> {
        if amount == 0 {
            return Err(DomainError::validation("restock amount must be positive").into());
        }
        let updated = self.with_slot(id, |r| r.add_supply(amount))?;
        tracing::info!(
            resource_id = %id,
            amount,
            quantity = updated.quantity(),
            "resource restocked"
        );
        Ok(updated)
    }

    /// Administrative absolute quantity adjustment.
    pub fn set_quantity(&self, id: ResourceId, quantity: u64) -> Result<Resource, InventoryError> {
        let updated = self.with_slot(id, |r| r.set_quantity(quantity))?;
        tracing::info!(resource_id = %id, quantity, "resource quantity adjusted");
        Ok(updated)
    }

    /// Administrative availability toggle (e.g. a machine returned from the field).
    pub fn set_available(
        &self,
        id: ResourceId,
        available: bool,
    ) -> Result<Resource, InventoryError> {
        self.with_slot(id, |r| {
            r.set_available(available);
            Ok(())
        })
    }

    fn slot(&self, id: ResourceId) -> Result<Arc<Mutex<Resource>>, InventoryError> {
        let map = self.slots.read().map_err(|_| InventoryError::Poisoned)?;
        map.get(&id).cloned().ok_or(InventoryError::NotFound(id))
    }

    /// Run `f` with the resource's lock held; `f` either mutates and succeeds or leaves the
    /// resource as it found it.
    fn with_slot(
        &self,
        id: ResourceId,
        f: impl FnOnce(&mut Resource) -> Result<(), InventoryError>,
    ) -> Result<Resource, InventoryError> {
        let slot = self.slot(id)?;
        let mut resource = slot.lock().map_err(|_| InventoryError::Poisoned)?;
        f(&mut resource)?;
        Ok(resource.clone())
    }
}

impl ResourceInventory for InMemoryInventory {
    fn get(&self, id: ResourceId) -> Result<Resource, InventoryError> {
        let slot = self.slot(id)?;
        let resource = slot.lock().map_err(|_| InventoryError::Poisoned)?;
        Ok(resource.clone())
    }

    fn try_deduct(&self, id: ResourceId, amount: u64) -> Result<Resource, InventoryError> {
        if amount == 0 {
            return Err(DomainError::validation("deduction amount must be positive").into());
        }
        self.with_slot(id, |r| {
            if r.quantity() < amount {
                return Err(InventoryError::InsufficientQuantity {
                    resource_id: id,
                    requested: amount,
                    available: r.quantity(),
                });
            }
            r.deduct(amount)
        })
    }

    fn try_set_unavailable(&self, id: ResourceId) -> Result<Resource, InventoryError> {
        self.with_slot(id, |r| {
            if !r.is_available() {
                return Err(InventoryError::AlreadyUnavailable(id));
            }
            r.set_available(false);
            Ok(())
        })
    }

    fn credit(&self, id: ResourceId, amount: u64) -> Result<Resource, InventoryError> {
        self.with_slot(id, |r| r.credit(amount))
    }

    fn mark_available(&self, id: ResourceId) -> Result<Resource, InventoryError> {
        self.with_slot(id, |r| {
            r.set_available(true);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Barrier;
    use std::thread;

    fn material(store: &InMemoryInventory, name: &str, quantity: u64) -> Resource {
        store
            .register(NewResource {
                name: name.to_string(),
                kind: ResourceKind::Material,
                quantity,
                available: true,
            })
            .unwrap()
    }

    fn machine(store: &InMemoryInventory, name: &str) -> Resource {
        store
            .register(NewResource {
                name: name.to_string(),
                kind: ResourceKind::Machine,
                quantity: 1,
                available: true,
            })
            .unwrap()
    }

    #[test]
    fn register_rejects_blank_name() {
        let store = InMemoryInventory::new();
        let err = store
            .register(NewResource {
                name: "   ".to_string(),
                kind: ResourceKind::Material,
                quantity: 1,
                available: true,
            })
            .unwrap_err();
        assert!(matches!(err, InventoryError::Domain(DomainError::Validation(_))));
    }

    #[test]
    fn get_unknown_resource_is_not_found() {
        let store = InMemoryInventory::new();
        let id = ResourceId::new();
        assert_eq!(store.get(id).unwrap_err(), InventoryError::NotFound(id));
    }

    #[test]
    fn deduct_decrements_and_tracks_allocated_total() {
        let store = InMemoryInventory::new();
        let cement = material(&store, "Cement", 10);

        let after = store.try_deduct(cement.id(), 4).unwrap();
        assert_eq!(after.quantity(), 6);
        assert_eq!(after.allocated_total(), 4);
        assert_eq!(after.cumulative_supply(), 10);
    }

    #[test]
    fn deduct_beyond_quantity_reports_deficit_and_changes_nothing() {
        let store = InMemoryInventory::new();
        let cement = material(&store, "Cement", 6);
        let before = store.get(cement.id()).unwrap();

        let err = store.try_deduct(cement.id(), 8).unwrap_err();
        assert_eq!(
            err,
            InventoryError::InsufficientQuantity {
                resource_id: cement.id(),
                requested: 8,
                available: 6,
            }
        );
        assert_eq!(store.get(cement.id()).unwrap(), before);
    }

    #[test]
    fn zero_deduction_is_a_validation_error() {
        let store = InMemoryInventory::new();
        let cement = material(&store, "Cement", 6);
        assert!(matches!(
            store.try_deduct(cement.id(), 0),
            Err(InventoryError::Domain(DomainError::Validation(_)))
        ));
    }

    #[test]
    fn machine_can_only_be_taken_once() {
        let store = InMemoryInventory::new();
        let excavator = machine(&store, "Excavator-1");

        store.try_set_unavailable(excavator.id()).unwrap();
        assert_eq!(
            store.try_set_unavailable(excavator.id()).unwrap_err(),
            InventoryError::AlreadyUnavailable(excavator.id())
        );

        store.mark_available(excavator.id()).unwrap();
        assert!(store.get(excavator.id()).unwrap().is_available());
    }

    #[test]
    fn credit_reverses_a_deduction() {
        let store = InMemoryInventory::new();
        let gravel = material(&store, "Gravel", 5);
        store.try_deduct(gravel.id(), 3).unwrap();

        let after = store.credit(gravel.id(), 3).unwrap();
        assert_eq!(after.quantity(), 5);
        assert_eq!(after.allocated_total(), 0);
    }

    #[test]
    fn set_quantity_below_current_is_folded_into_supply() {
        let store = InMemoryInventory::new();
        let asphalt = material(&store, "Asphalt", 10);
        store.try_deduct(asphalt.id(), 4).unwrap();

        let after = store.set_quantity(asphalt.id(), 2).unwrap();
        assert_eq!(after.quantity(), 2);
        assert_eq!(after.cumulative_supply() - after.allocated_total(), after.quantity());
    }

    #[test]
    fn overflowing_supply_is_refused_and_resource_stays_usable() {
        let store = InMemoryInventory::new();
        let cement = material(&store, "Cement", u64::MAX);

        let err = store.restock(cement.id(), 1).unwrap_err();
        assert!(matches!(err, InventoryError::Domain(DomainError::Validation(_))));

        store.try_deduct(cement.id(), 5).unwrap();
        let err = store.set_quantity(cement.id(), u64::MAX).unwrap_err();
        assert!(matches!(err, InventoryError::Domain(DomainError::Validation(_))));

        let after = store.get(cement.id()).unwrap();
        assert_eq!(after.quantity(), u64::MAX - 5);
        assert_eq!(after.allocated_total(), 5);
        assert_eq!(after.cumulative_supply(), u64::MAX);
        assert!(store.try_deduct(cement.id(), 1).is_ok());
    }

    #[test]
    fn list_returns_registration_order() {
        let store = InMemoryInventory::new();
        let a = material(&store, "A", 1);
        let b = machine(&store, "B");
        let ids: Vec<_> = store.list().unwrap().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![a.id(), b.id()]);
    }

    #[test]
    fn concurrent_deductions_never_oversell() {
        let store = Arc::new(InMemoryInventory::new());
        let sand = material(&store, "Sand", 10).id();
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    store.try_deduct(sand, 3).is_ok()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count() as u64;

        assert_eq!(winners, 3);
        assert_eq!(store.get(sand).unwrap().quantity(), 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Deduct(u64),
        Credit(u64),
        Restock(u64),
        Set(u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u64..20).prop_map(Op::Deduct),
            (1u64..5).prop_map(Op::Credit),
            (1u64..20).prop_map(Op::Restock),
            (0u64..30).prop_map(Op::Set),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: supply minus allocations always equals the on-hand quantity.
        #[test]
        fn supply_minus_allocated_equals_quantity(initial in 0u64..50, ops in prop::collection::vec(op(), 0..40)) {
            let store = InMemoryInventory::new();
            let r = material(&store, "Cement", initial);

            for op in ops {
                let _ = match op {
                    Op::Deduct(n) => store.try_deduct(r.id(), n),
                    Op::Credit(n) => {
                        // Only credit what was actually drawn down, as the coordinator does.
                        let drawn = store.get(r.id()).unwrap().allocated_total();
                        store.credit(r.id(), n.min(drawn))
                    }
                    Op::Restock(n) => store.restock(r.id(), n),
                    Op::Set(n) => store.set_quantity(r.id(), n),
                };
                let now = store.get(r.id()).unwrap();
                prop_assert_eq!(now.cumulative_supply() - now.allocated_total(), now.quantity());
            }
        }
    }
}
