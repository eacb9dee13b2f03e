//! Database models for the grievance lifecycle service.
//!
//! One module per table; query methods live on the model structs.

mod assignment;
mod coordinator;
mod deadline;
mod escalation_event;
mod escalation_rule;
mod grievance;
mod timeline_entry;
mod types;

pub use assignment::Assignment;
pub use coordinator::{Coordinator, CreateCoordinator, UpdateCoordinator};
pub use deadline::{CreateDeadline, Deadline};
pub use escalation_event::{EscalationEvent, EscalationEventFilter, RecordEscalationEvent};
pub use escalation_rule::{CreateEscalationRule, EscalationRule, UpdateEscalationRule};
pub use grievance::{CreateGrievance, Grievance, GrievanceFilter};
pub use timeline_entry::{AppendTimelineEntry, TimelineEntry};
pub use types::{
    ActivityType, DeadlineStatus, EscalationAction, GrievanceStatus, PriorityLevel, Severity,
    TriggerCondition,
};
