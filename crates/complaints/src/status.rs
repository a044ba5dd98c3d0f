//! Complaint lifecycle state machine.
//!
//! ```text
//! pending ──► under_review ──► assigned ──► in_progress ──► completed
//!    │  ▲          │               └──────────────────────────▲
//!    │  └──────────┤
//!    ▼             ▼
//! rejected ◄───────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ComplaintError;

/// Complaint status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Pending,
    UnderReview,
    Assigned,
    InProgress,
    Completed,
    Rejected,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 6] = [
        ComplaintStatus::Pending,
        ComplaintStatus::UnderReview,
        ComplaintStatus::Assigned,
        ComplaintStatus::InProgress,
        ComplaintStatus::Completed,
        ComplaintStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::UnderReview => "under_review",
            ComplaintStatus::Assigned => "assigned",
            ComplaintStatus::InProgress => "in_progress",
            ComplaintStatus::Completed => "completed",
            ComplaintStatus::Rejected => "rejected",
        }
    }

    /// Targets reachable in one step from `self`.
    pub fn allowed_targets(&self) -> &'static [ComplaintStatus] {
        use ComplaintStatus::*;
        match self {
            Pending => &[UnderReview, Rejected],
            // `Pending` here is the resource-request rejection path.
            UnderReview => &[Assigned, Rejected, Pending],
            Assigned => &[InProgress, Completed],
            InProgress => &[Completed],
            Completed | Rejected => &[],
        }
    }

    pub fn can_transition_to(&self, target: ComplaintStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_targets().is_empty()
    }

    pub fn ensure_transition(&self, target: ComplaintStatus) -> Result<(), ComplaintError> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(ComplaintError::InvalidTransition {
                from: *self,
                to: target,
            })
        }
    }
}

impl core::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ComplaintStatus {
    type Err = ComplaintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComplaintStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ComplaintError::UnknownStatus(s.to_string()))
    }
}
