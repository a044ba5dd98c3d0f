use serde::{Deserialize, Serialize};

use roadworks_core::{DomainError, ResourceId};

use crate::error::InventoryError;

/// Resource category.
///
/// Materials and personnel are allocated by quantity; machines are allocated as whole
/// units by flipping their availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Material,
    Machine,
    Personnel,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Material => "material",
            ResourceKind::Machine => "machine",
            ResourceKind::Personnel => "personnel",
        }
    }

    /// Whether allocation draws down `quantity` (as opposed to flipping `available`).
    pub fn is_quantity_tracked(&self) -> bool {
        !matches!(self, ResourceKind::Machine)
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time snapshot of one inventory resource.
///
/// Invariant maintained by the store: `cumulative_supply - allocated_total == quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    id: ResourceId,
    name: String,
    kind: ResourceKind,
    quantity: u64,
    available: bool,
    /// Initial quantity plus every administrative adjustment since registration.
    cumulative_supply: u64,
    /// Net quantity drawn down by committed allocations.
    allocated_total: u64,
    /// +1 per mutation.
    version: u64,
}

impl Resource {
    pub(crate) fn new(
        id: ResourceId,
        name: String,
        kind: ResourceKind,
        quantity: u64,
        available: bool,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            quantity,
            available,
            cumulative_supply: quantity,
            allocated_total: 0,
            version: 1,
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn cumulative_supply(&self) -> u64 {
        self.cumulative_supply
    }

    pub fn allocated_total(&self) -> u64 {
        self.allocated_total
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Callers check `quantity >= amount` first; the check here only guards the counters.
    pub(crate) fn deduct(&mut self, amount: u64) -> Result<(), InventoryError> {
        let quantity = self
            .quantity
            .checked_sub(amount)
            .ok_or(InventoryError::InsufficientQuantity {
                resource_id: self.id,
                requested: amount,
                available: self.quantity,
            })?;
        let allocated_total =
            checked(self.allocated_total.checked_add(amount), "allocated total")?;
        self.quantity = quantity;
        self.allocated_total = allocated_total;
        self.version += 1;
        Ok(())
    }

    pub(crate) fn credit(&mut self, amount: u64) -> Result<(), InventoryError> {
        self.quantity = checked(self.quantity.checked_add(amount), "quantity")?;
        self.allocated_total = self.allocated_total.saturating_sub(amount);
        self.version += 1;
        Ok(())
    }

    pub(crate) fn set_available(&mut self, available: bool) {
        self.available = available;
        self.version += 1;
    }

    /// Administrative restock: new supply enters the pool.
    pub(crate) fn add_supply(&mut self, amount: u64) -> Result<(), InventoryError> {
        let quantity = checked(self.quantity.checked_add(amount), "quantity")?;
        let cumulative_supply =
            checked(self.cumulative_supply.checked_add(amount), "cumulative supply")?;
        self.quantity = quantity;
        self.cumulative_supply = cumulative_supply;
        self.version += 1;
        Ok(())
    }

    /// Administrative absolute adjustment. The delta is folded into the supply so the
    /// conservation invariant keeps holding after write-offs.
    pub(crate) fn set_quantity(&mut self, quantity: u64) -> Result<(), InventoryError> {
        self.cumulative_supply =
            checked(self.allocated_total.checked_add(quantity), "cumulative supply")?;
        self.quantity = quantity;
        self.version += 1;
        Ok(())
    }
}

/// Overflow is refused before anything is written, so the slot lock is never poisoned.
fn checked(value: Option<u64>, what: &str) -> Result<u64, InventoryError> {
    value.ok_or_else(|| {
        DomainError::validation(format!("{what} would exceed {}", u64::MAX)).into()
    })
}
