//! Derived view of complaints currently asking for resources.
//!
//! Pending requests are never stored; they are recomputed from complaint state on
//! every read so the view cannot drift from the complaints themselves.

use chrono::{DateTime, Utc};
use serde::Serialize;

use roadworks_core::ComplaintId;

use crate::assignment::ResourceCategory;
use crate::complaint::{Complaint, Priority, Severity};
use crate::status::ComplaintStatus;

/// A complaint awaiting an allocation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingRequest {
    pub complaint_id: ComplaintId,
    pub title: String,
    pub location: String,
    pub materials: String,
    pub machines: String,
    pub personnel: String,
    pub severity: Severity,
    pub priority: Option<Priority>,
    pub estimated_days: Option<u32>,
    pub requested_at: Option<DateTime<Utc>>,
}

impl PendingRequest {
    fn from_complaint(c: &Complaint) -> Self {
        let text = |category| c.estimates().get(category).unwrap_or_default().to_string();
        Self {
            complaint_id: c.id(),
            title: c.title().to_string(),
            location: c.location().to_string(),
            materials: text(ResourceCategory::Materials),
            machines: text(ResourceCategory::Machines),
            personnel: text(ResourceCategory::Personnel),
            severity: c.severity(),
            priority: c.priority(),
            estimated_days: c.estimated_days(),
            requested_at: c.requested_at(),
        }
    }
}

/// Complaints in `under_review` that are requesting resources, most urgent first.
///
/// Ordered by severity (critical > high > medium > low), then priority
/// (high > medium > low > unknown). The sort is stable, so ties keep input order.
pub fn pending_requests<'a>(complaints: impl IntoIterator<Item = &'a Complaint>) -> Vec<PendingRequest> {
    let mut requests: Vec<PendingRequest> = complaints
        .into_iter()
        .filter(|c| c.status() == ComplaintStatus::UnderReview && c.is_requesting_resources())
        .map(PendingRequest::from_complaint)
        .collect();

    requests.sort_by(|a, b| {
        b.severity
            .rank()
            .cmp(&a.severity.rank())
            .then_with(|| Priority::rank(b.priority).cmp(&Priority::rank(a.priority)))
    });
    requests
}
