use serde::Deserialize;

use roadworks_allocation::AllocationBundle;
use roadworks_complaints::{ComplaintStatus, ResourceEstimates};
use roadworks_core::UserId;
use roadworks_inventory::{Resource, ResourceKind};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterResourceRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    #[serde(default)]
    pub quantity: u64,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Administrative adjustment; `quantity` is absolute and signed so a negative value
/// gets a validation error instead of a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct UpdateResourceRequest {
    pub quantity: Option<i64>,
    pub available: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub amount: u64,
}

#[derive(Debug, Deserialize)]
pub struct RequestResourcesRequest {
    #[serde(default)]
    pub estimates: Option<ResourceEstimates>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequestRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub expected: ComplaintStatus,
    pub target: ComplaintStatus,
}

#[derive(Debug, Deserialize)]
pub struct AllocateRequest {
    pub allocated_by: UserId,
    #[serde(flatten)]
    pub bundle: AllocationBundle,
}

// -------------------------
// Response mapping
// -------------------------

pub fn resource_to_json(r: &Resource) -> serde_json::Value {
    serde_json::json!({
        "id": r.id().to_string(),
        "name": r.name(),
        "type": r.kind().as_str(),
        "quantity": r.quantity(),
        "available": r.is_available(),
        "cumulative_supply": r.cumulative_supply(),
        "allocated_total": r.allocated_total(),
    })
}
