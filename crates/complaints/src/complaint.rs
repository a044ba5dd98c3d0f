use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roadworks_core::{ComplaintId, UserId};

use crate::assignment::{AssignedResources, ResourceCategory};
use crate::status::ComplaintStatus;

/// Reporter/assessor-assigned urgency of the road problem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Ordering weight used when ranking pending requests.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 4,
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }
}

/// Operational scheduling weight, distinct from severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Ordering weight; an unknown priority ranks 0.
    pub fn rank(priority: Option<Priority>) -> u8 {
        match priority {
            Some(Priority::High) => 3,
            Some(Priority::Medium) => 2,
            Some(Priority::Low) => 1,
            None => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemType {
    Pothole,
    CrackedRoad,
    Flooding,
    PoorDrainage,
    SidewalkIssue,
    #[default]
    Other,
}

/// Free-text resource estimates written by the assessing supervisor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEstimates {
    #[serde(default)]
    pub materials: Option<String>,
    #[serde(default)]
    pub machines: Option<String>,
    #[serde(default)]
    pub personnel: Option<String>,
}

impl ResourceEstimates {
    pub fn get(&self, category: ResourceCategory) -> Option<&str> {
        let text = match category {
            ResourceCategory::Materials => &self.materials,
            ResourceCategory::Machines => &self.machines,
            ResourceCategory::Personnel => &self.personnel,
        };
        text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Categories with a non-blank estimate.
    pub fn requested_categories(&self) -> Vec<ResourceCategory> {
        ResourceCategory::ALL
            .into_iter()
            .filter(|c| self.get(*c).is_some())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.requested_categories().is_empty()
    }
}

/// Intake input (complaint submission is an external collaborator; this is its payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComplaint {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub problem_type: ProblemType,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub reporter_id: Option<UserId>,
}

/// A road-repair complaint.
///
/// Fields are read-only outside this crate; all state changes go through
/// [`crate::store::InMemoryComplaintStore`] so the lifecycle invariants hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    pub(crate) id: ComplaintId,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) problem_type: ProblemType,
    pub(crate) location: String,
    pub(crate) reporter_id: Option<UserId>,
    pub(crate) status: ComplaintStatus,
    pub(crate) severity: Severity,
    pub(crate) priority: Option<Priority>,
    pub(crate) estimates: ResourceEstimates,
    pub(crate) estimated_days: Option<u32>,
    pub(crate) resource_requested: bool,
    pub(crate) admin_notes: Option<String>,
    pub(crate) assigned_resources: Option<AssignedResources>,
    pub(crate) assigned_by: Option<UserId>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) assessed_at: Option<DateTime<Utc>>,
    pub(crate) requested_at: Option<DateTime<Utc>>,
    pub(crate) assigned_at: Option<DateTime<Utc>>,
    pub(crate) completed_at: Option<DateTime<Utc>>,
    pub(crate) version: u64,
}

impl Complaint {
    pub(crate) fn from_intake(new: NewComplaint, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ComplaintId::new(),
            title: new.title.trim().to_string(),
            description: new.description,
            problem_type: new.problem_type,
            location: new.location,
            reporter_id: new.reporter_id,
            status: ComplaintStatus::Pending,
            severity: new.severity,
            priority: None,
            estimates: ResourceEstimates::default(),
            estimated_days: None,
            resource_requested: false,
            admin_notes: None,
            assigned_resources: None,
            assigned_by: None,
            created_at,
            assessed_at: None,
            requested_at: None,
            assigned_at: None,
            completed_at: None,
            version: 1,
        }
    }

    pub fn id(&self) -> ComplaintId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn problem_type(&self) -> ProblemType {
        self.problem_type
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn status(&self) -> ComplaintStatus {
        self.status
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn estimates(&self) -> &ResourceEstimates {
        &self.estimates
    }

    pub fn estimated_days(&self) -> Option<u32> {
        self.estimated_days
    }

    pub fn resource_requested(&self) -> bool {
        self.resource_requested
    }

    pub fn admin_notes(&self) -> Option<&str> {
        self.admin_notes.as_deref()
    }

    pub fn assigned_resources(&self) -> Option<&AssignedResources> {
        self.assigned_resources.as_ref()
    }

    pub fn assigned_by(&self) -> Option<UserId> {
        self.assigned_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn assessed_at(&self) -> Option<DateTime<Utc>> {
        self.assessed_at
    }

    pub fn requested_at(&self) -> Option<DateTime<Utc>> {
        self.requested_at
    }

    pub fn assigned_at(&self) -> Option<DateTime<Utc>> {
        self.assigned_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// +1 per mutation; lets a compensating write prove nothing happened in between.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether this complaint is asking for resources (flagged or with any estimate).
    pub fn is_requesting_resources(&self) -> bool {
        self.resource_requested || !self.estimates.is_empty()
    }
}
