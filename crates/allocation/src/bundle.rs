//! Typed allocation request.
//!
//! One line type per category; anything that does not fit these shapes is rejected at
//! deserialization, before the coordinator sees it.

use serde::{Deserialize, Serialize};

use roadworks_complaints::ResourceCategory;
use roadworks_core::ResourceId;

use crate::error::AllocationError;

/// A material or personnel line: draw `quantity` units from the resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityLine {
    pub resource_id: ResourceId,
    pub quantity: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A machine line. Machines are taken whole; `quantity`, if present, must be 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineLine {
    pub resource_id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// The concrete resources an administrator commits to one complaint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationBundle {
    #[serde(default)]
    pub materials: Vec<QuantityLine>,
    #[serde(default)]
    pub machines: Vec<MachineLine>,
    #[serde(default)]
    pub personnel: Vec<QuantityLine>,
    /// Requested categories the administrator deliberately leaves unfilled.
    #[serde(default)]
    pub acknowledged_omissions: Vec<ResourceCategory>,
}

/// A bundle line after merging, tagged with its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlannedLine {
    pub category: ResourceCategory,
    pub resource_id: ResourceId,
    pub quantity: u64,
    pub unit: Option<String>,
}

impl AllocationBundle {
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty() && self.machines.is_empty() && self.personnel.is_empty()
    }

    pub fn supplies(&self, category: ResourceCategory) -> bool {
        match category {
            ResourceCategory::Materials => !self.materials.is_empty(),
            ResourceCategory::Machines => !self.machines.is_empty(),
            ResourceCategory::Personnel => !self.personnel.is_empty(),
        }
    }

    pub fn acknowledges(&self, category: ResourceCategory) -> bool {
        self.acknowledged_omissions.contains(&category)
    }

    /// First material or personnel line that asks for nothing.
    pub(crate) fn zero_quantity_line(&self) -> Option<&QuantityLine> {
        self.materials
            .iter()
            .chain(&self.personnel)
            .find(|line| line.quantity == 0)
    }

    /// Flatten into one line per (category, resource), first-seen order.
    ///
    /// Repeated material/personnel lines have their quantities summed; a repeated machine
    /// is still one machine.
    pub(crate) fn planned_lines(&self) -> Result<Vec<PlannedLine>, AllocationError> {
        let mut out: Vec<PlannedLine> = Vec::new();

        for (category, lines) in [
            (ResourceCategory::Materials, &self.materials),
            (ResourceCategory::Personnel, &self.personnel),
        ] {
            for line in lines {
                merge_quantity(&mut out, category, line.resource_id, line.quantity, &line.unit)?;
            }
        }

        for line in &self.machines {
            if let Some(q) = line.quantity {
                if q != 1 {
                    return Err(AllocationError::Validation(format!(
                        "machine {} must be allocated as exactly one unit, got {q}",
                        line.resource_id
                    )));
                }
            }
            let seen = out
                .iter()
                .any(|p| {
                    p.category == ResourceCategory::Machines && p.resource_id == line.resource_id
                });
            if !seen {
                out.push(PlannedLine {
                    category: ResourceCategory::Machines,
                    resource_id: line.resource_id,
                    quantity: 1,
                    unit: line.unit.clone(),
                });
            }
        }

        Ok(out)
    }
}

fn merge_quantity(
    out: &mut Vec<PlannedLine>,
    category: ResourceCategory,
    resource_id: ResourceId,
    quantity: u64,
    unit: &Option<String>,
) -> Result<(), AllocationError> {
    match out
        .iter_mut()
        .find(|p| p.category == category && p.resource_id == resource_id)
    {
        Some(existing) => {
            existing.quantity = existing.quantity.checked_add(quantity).ok_or_else(|| {
                AllocationError::Validation(format!("quantity overflow for resource {resource_id}"))
            })?;
            if existing.unit.is_none() {
                existing.unit = unit.clone();
            }
        }
        None => out.push(PlannedLine {
            category,
            resource_id,
            quantity,
            unit: unit.clone(),
        }),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qty(resource_id: ResourceId, quantity: u64) -> QuantityLine {
        QuantityLine {
            resource_id,
            quantity,
            unit: None,
        }
    }

    #[test]
    fn duplicate_lines_are_merged_per_category() {
        let cement = ResourceId::new();
        let crew = ResourceId::new();
        let bundle = AllocationBundle {
            materials: vec![qty(cement, 2), qty(cement, 3)],
            personnel: vec![qty(crew, 1)],
            ..AllocationBundle::default()
        };

        let lines = bundle.planned_lines().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].resource_id, cement);
        assert_eq!(lines[0].quantity, 5);
        assert_eq!(lines[1].category, ResourceCategory::Personnel);
    }

    #[test]
    fn zero_line_is_found_even_beside_a_real_one() {
        let cement = ResourceId::new();
        let crew = ResourceId::new();
        let bundle = AllocationBundle {
            materials: vec![qty(cement, 4)],
            personnel: vec![qty(crew, 2), qty(crew, 0)],
            ..AllocationBundle::default()
        };
        assert_eq!(bundle.zero_quantity_line().map(|l| l.resource_id), Some(crew));

        let full = AllocationBundle {
            materials: vec![qty(cement, 4)],
            ..AllocationBundle::default()
        };
        assert!(full.zero_quantity_line().is_none());
    }

    #[test]
    fn machine_quantity_defaults_to_one_and_repeats_collapse() {
        let excavator = ResourceId::new();
        let line = MachineLine {
            resource_id: excavator,
            quantity: None,
            unit: None,
        };
        let bundle = AllocationBundle {
            machines: vec![line.clone(), line],
            ..AllocationBundle::default()
        };

        let lines = bundle.planned_lines().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 1);
    }

    #[test]
    fn machine_line_with_more_than_one_unit_is_rejected() {
        let bundle = AllocationBundle {
            machines: vec![MachineLine {
                resource_id: ResourceId::new(),
                quantity: Some(2),
                unit: None,
            }],
            ..AllocationBundle::default()
        };
        assert!(matches!(bundle.planned_lines(), Err(AllocationError::Validation(_))));
    }

    #[test]
    fn deserializes_with_optional_fields_missing() {
        let bundle: AllocationBundle = serde_json::from_str(
            r#"{"materials":[{"resource_id":"0190a5b4-8f1e-7cc3-a2f6-3b3c1b6f0d11","quantity":4,"unit":"bags"}],
                "machines":[{"resource_id":"0190a5b4-8f1e-7cc3-a2f6-3b3c1b6f0d12"}]}"#,
        )
        .unwrap();
        assert_eq!(bundle.materials[0].unit.as_deref(), Some("bags"));
        assert_eq!(bundle.machines[0].quantity, None);
        assert!(bundle.personnel.is_empty());
        assert!(bundle.acknowledged_omissions.is_empty());
    }

    #[test]
    fn line_without_quantity_is_malformed() {
        let parsed = serde_json::from_str::<AllocationBundle>(
            r#"{"materials":[{"resource_id":"0190a5b4-8f1e-7cc3-a2f6-3b3c1b6f0d11"}]}"#,
        );
        assert!(parsed.is_err());
    }
}
