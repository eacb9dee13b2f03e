//! Grievance lifecycle state machine.
//!
//! The graph is forward-only:
//!
//! ```text
//! submitted → under_review → in_progress → {resolved | rejected} → closed
//!                  │               │             ▲
//!                  └── escalated ──┘─────────────┘
//! ```
//!
//! `escalated` is reachable from `under_review` and `in_progress` and exits
//! back into `in_progress` or directly into an outcome. `closed` is the sole
//! terminal state.

use grievance_db::models::GrievanceStatus;

use crate::error::{GrievanceError, Result};

/// Allowed successor states for a given status.
#[must_use]
pub fn allowed_transitions(from: GrievanceStatus) -> &'static [GrievanceStatus] {
    use GrievanceStatus::*;
    match from {
        Submitted => &[UnderReview],
        UnderReview => &[InProgress, Escalated],
        InProgress => &[Resolved, Rejected, Escalated],
        Escalated => &[InProgress, Resolved, Rejected],
        Resolved => &[Closed],
        Rejected => &[Closed],
        Closed => &[],
    }
}

/// Whether the graph permits `from → to`.
#[must_use]
pub fn can_transition(from: GrievanceStatus, to: GrievanceStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Validate a transition, returning the conflict error on violation.
pub fn validate_transition(from: GrievanceStatus, to: GrievanceStatus) -> Result<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(GrievanceError::InvalidTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GrievanceStatus::*;

    #[test]
    fn test_happy_path() {
        assert!(can_transition(Submitted, UnderReview));
        assert!(can_transition(UnderReview, InProgress));
        assert!(can_transition(InProgress, Resolved));
        assert!(can_transition(Resolved, Closed));
    }

    #[test]
    fn test_rejection_path() {
        assert!(can_transition(InProgress, Rejected));
        assert!(can_transition(Rejected, Closed));
    }

    #[test]
    fn test_escalation_entry_points() {
        assert!(can_transition(UnderReview, Escalated));
        assert!(can_transition(InProgress, Escalated));
        assert!(!can_transition(Submitted, Escalated));
    }

    #[test]
    fn test_escalation_exits() {
        assert!(can_transition(Escalated, InProgress));
        assert!(can_transition(Escalated, Resolved));
        assert!(can_transition(Escalated, Rejected));
        assert!(!can_transition(Escalated, Closed));
    }

    #[test]
    fn test_closed_is_terminal() {
        for to in [
            Submitted,
            UnderReview,
            InProgress,
            Resolved,
            Rejected,
            Escalated,
            Closed,
        ] {
            assert!(!can_transition(Closed, to));
        }
    }

    #[test]
    fn test_no_backward_transitions() {
        assert!(!can_transition(Resolved, InProgress));
        assert!(!can_transition(UnderReview, Submitted));
        assert!(!can_transition(InProgress, UnderReview));
    }

    #[test]
    fn test_validate_transition_reports_endpoints() {
        let err = validate_transition(Closed, Submitted).unwrap_err();
        match err {
            GrievanceError::InvalidTransition { from, to } => {
                assert_eq!(from, Closed);
                assert_eq!(to, Submitted);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
