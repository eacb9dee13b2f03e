//! Shared enum definitions for the grievance lifecycle.
//!
//! All enums are stored as snake_case text in SQLite and serialized the same
//! way over the wire.

use serde::{Deserialize, Serialize};

/// Priority of a grievance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Low,
    Medium,
    High,
    Urgent,
}

/// Lifecycle status of a grievance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GrievanceStatus {
    Submitted,
    UnderReview,
    InProgress,
    Resolved,
    Rejected,
    Escalated,
    Closed,
}

/// Activity recorded in the grievance timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Created,
    StatusChanged,
    Assigned,
    MessageSent,
    DeadlineSet,
    Escalated,
    Resolved,
    Closed,
}

/// Condition under which an escalation rule matches a grievance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TriggerCondition {
    /// Grievance age in days reached the threshold.
    TimeExceeded,
    /// Status has not changed for the threshold number of days.
    StatusUnchanged,
    /// An associated deadline is overdue and not completed.
    DeadlineMissed,
    /// Applied only via explicit operator action, never auto-matched.
    Manual,
}

/// Action applied when an escalation rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EscalationAction {
    /// Move the case to the least-loaded coordinator in the department.
    Reassign,
    /// Record a supervisor notification (dispatch is external).
    NotifySupervisor,
    /// Bump priority one step, capped at urgent.
    EscalatePriority,
    /// Resolve the grievance directly.
    AutoResolve,
}

/// Severity recorded on an escalation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Derived urgency bucket for a deadline. Computed on read, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DeadlineStatus {
    Completed,
    Overdue,
    Critical,
    Warning,
    Normal,
}

impl GrievanceStatus {
    /// The snake_case wire/storage spelling.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
            Self::Escalated => "escalated",
            Self::Closed => "closed",
        }
    }

    /// Statuses from which no escalation rule may match.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected | Self::Closed)
    }

    /// Whether any further transition is allowed at all.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl PriorityLevel {
    /// One-step priority bump, capped at urgent.
    #[must_use]
    pub fn escalated(&self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High | Self::Urgent => Self::Urgent,
        }
    }
}

impl Severity {
    /// Map a grievance priority to the severity recorded on escalation events.
    #[must_use]
    pub fn from_priority(priority: PriorityLevel) -> Self {
        match priority {
            PriorityLevel::Urgent | PriorityLevel::High => Self::High,
            PriorityLevel::Medium => Self::Medium,
            PriorityLevel::Low => Self::Low,
        }
    }
}
