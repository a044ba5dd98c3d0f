use thiserror::Error;

/// Business-rule failure shared by the complaint and inventory stores.
///
/// Allocation has its own, richer taxonomy in `roadworks-allocation`; this one only
/// covers bad input and stale writes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),

    /// `kind` is the id type, `reason` the parser's complaint.
    #[error("invalid {kind}: {reason}")]
    InvalidId { kind: &'static str, reason: String },

    /// The record moved on between read and write.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
