//! The resource snapshot recorded on a complaint (and in the allocation ledger) when
//! resources are committed to it.

use serde::{Deserialize, Serialize};

use roadworks_core::ResourceId;

/// The three resource categories a request or bundle is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    Materials,
    Machines,
    Personnel,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 3] = [
        ResourceCategory::Materials,
        ResourceCategory::Machines,
        ResourceCategory::Personnel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::Materials => "materials",
            ResourceCategory::Machines => "machines",
            ResourceCategory::Personnel => "personnel",
        }
    }
}

impl core::fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One committed line: which resource, how much of it.
///
/// `name` is the resource name at allocation time. Machines always carry quantity 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedLine {
    pub resource_id: ResourceId,
    pub name: String,
    pub quantity: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Validated, committed bundle. Written once at the `assigned` transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedResources {
    pub materials: Vec<AssignedLine>,
    pub machines: Vec<AssignedLine>,
    pub personnel: Vec<AssignedLine>,
}

impl AssignedResources {
    pub fn lines(&self, category: ResourceCategory) -> &[AssignedLine] {
        match category {
            ResourceCategory::Materials => &self.materials,
            ResourceCategory::Machines => &self.machines,
            ResourceCategory::Personnel => &self.personnel,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty() && self.machines.is_empty() && self.personnel.is_empty()
    }

    /// Quantity drawn down from `resource_id` (materials and personnel; machines are
    /// taken by availability, not quantity).
    pub fn deducted_quantity_of(&self, resource_id: ResourceId) -> u64 {
        self.materials
            .iter()
            .chain(&self.personnel)
            .filter(|l| l.resource_id == resource_id)
            .map(|l| l.quantity)
            .sum()
    }
}
