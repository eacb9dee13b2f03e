//! Domain error type for grievance lifecycle operations.

use grievance_db::models::GrievanceStatus;
use thiserror::Error;

/// Errors produced by the lifecycle, deadline, escalation, and workload
/// operations.
#[derive(Debug, Error)]
pub enum GrievanceError {
    /// Grievance not found.
    #[error("Grievance not found: {0}")]
    GrievanceNotFound(i64),

    /// Deadline not found.
    #[error("Deadline not found: {0}")]
    DeadlineNotFound(i64),

    /// Escalation rule not found.
    #[error("Escalation rule not found: {0}")]
    RuleNotFound(i64),

    /// Escalation event not found.
    #[error("Escalation event not found: {0}")]
    EscalationEventNotFound(i64),

    /// Coordinator not found.
    #[error("Coordinator not found: {0}")]
    CoordinatorNotFound(i64),

    /// The requested status change is not allowed by the lifecycle graph.
    #[error("Invalid status transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: GrievanceStatus,
        to: GrievanceStatus,
    },

    /// No active coordinator is available in the department.
    #[error("No coordinator available in department: {0}")]
    NoCoordinatorAvailable(String),

    /// A required field is missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A manual rule was applied automatically, or a non-manual rule was
    /// triggered by hand.
    #[error("Rule {0} cannot be triggered this way")]
    RuleNotTriggerable(i64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl GrievanceError {
    /// Whether the error maps to a not-found condition.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::GrievanceNotFound(_)
                | Self::DeadlineNotFound(_)
                | Self::RuleNotFound(_)
                | Self::EscalationEventNotFound(_)
                | Self::CoordinatorNotFound(_)
        )
    }

    /// Whether the error maps to a conflicting state change.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, GrievanceError>;
