//! Request and response bodies for the grievance API.
//!
//! Rule and grievance attributes travel in snake_case, matching storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use grievance_db::models::{
    Assignment, CreateCoordinator, CreateDeadline, CreateEscalationRule, CreateGrievance,
    Deadline, DeadlineStatus, EscalationAction, EscalationEvent, EscalationRule, Grievance,
    GrievanceStatus, PriorityLevel, TimelineEntry, TriggerCondition, UpdateCoordinator,
    UpdateEscalationRule,
};

use crate::services::{EscalationMetrics, Workload};

/// Deserializer that keeps "field absent" distinct from "field set to null".
/// Absent stays `None` via `#[serde(default)]`; an explicit null becomes
/// `Some(None)` and clears the stored value.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Grievances
// ---------------------------------------------------------------------------

/// Body for submitting a grievance.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitGrievanceRequest {
    pub student_id: i64,
    #[validate(length(min = 1, message = "grievance_type must not be empty"))]
    pub grievance_type: String,
    pub subcategory: Option<String>,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    /// Defaults to medium when omitted.
    pub priority: Option<PriorityLevel>,
    pub department: Option<String>,
    pub file_path: Option<String>,
}

impl SubmitGrievanceRequest {
    #[must_use]
    pub fn into_input(self) -> CreateGrievance {
        CreateGrievance {
            student_id: self.student_id,
            grievance_type: self.grievance_type,
            subcategory: self.subcategory,
            description: self.description,
            priority: self.priority.unwrap_or(PriorityLevel::Medium),
            department: self.department,
            file_path: self.file_path,
        }
    }
}

/// Body for a status update.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: GrievanceStatus,
    pub comment: Option<String>,
}

/// Body for assigning a grievance.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignGrievanceRequest {
    /// Explicit coordinator; picked by workload when omitted.
    pub coordinator_id: Option<i64>,
}

/// Query parameters for listing grievances.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListGrievancesQuery {
    pub student_id: Option<i64>,
    pub status: Option<GrievanceStatus>,
    pub grievance_type: Option<String>,
    pub priority: Option<PriorityLevel>,
    pub department: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paged list of grievances.
#[derive(Debug, Serialize, ToSchema)]
pub struct GrievanceListResponse {
    pub items: Vec<Grievance>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Timeline of one grievance, oldest entry first.
#[derive(Debug, Serialize, ToSchema)]
pub struct TimelineResponse {
    pub grievance_id: i64,
    pub entries: Vec<TimelineEntry>,
}

/// Result of an assignment.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentResponse {
    #[serde(flatten)]
    pub assignment: Assignment,
}

// ---------------------------------------------------------------------------
// Deadlines
// ---------------------------------------------------------------------------

/// Body for creating a deadline.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDeadlineRequest {
    pub grievance_id: i64,
    #[validate(length(min = 1, message = "deadline_type must not be empty"))]
    pub deadline_type: String,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    pub due_at: DateTime<Utc>,
    pub coordinator_name: Option<String>,
}

impl CreateDeadlineRequest {
    #[must_use]
    pub fn into_input(self) -> CreateDeadline {
        CreateDeadline {
            grievance_id: self.grievance_id,
            deadline_type: self.deadline_type,
            description: self.description,
            due_at: self.due_at,
            coordinator_name: self.coordinator_name,
        }
    }
}

/// Body for extending a deadline.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ExtendDeadlineRequest {
    pub new_due_at: DateTime<Utc>,
    #[validate(length(min = 1, message = "reason must not be empty"))]
    pub reason: String,
}

/// Query parameters for listing deadlines.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListDeadlinesQuery {
    pub grievance_id: Option<i64>,
    /// Only deadlines not yet completed.
    pub pending: Option<bool>,
}

/// A deadline with its derived urgency status.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeadlineResponse {
    #[serde(flatten)]
    pub deadline: Deadline,
    /// Derived from `(due_at, is_completed, now)` at read time.
    pub status: DeadlineStatus,
}

impl DeadlineResponse {
    #[must_use]
    pub fn derive(deadline: Deadline, now: DateTime<Utc>) -> Self {
        let status = deadline.derived_status(now);
        Self { deadline, status }
    }
}

/// List of deadlines with derived statuses.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeadlineListResponse {
    pub items: Vec<DeadlineResponse>,
}

// ---------------------------------------------------------------------------
// Escalation
// ---------------------------------------------------------------------------

/// Body for creating an escalation rule.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRuleRequest {
    #[validate(length(min = 1, message = "rule_name must not be empty"))]
    pub rule_name: String,
    pub grievance_type: Option<String>,
    pub priority: Option<PriorityLevel>,
    pub trigger_condition: TriggerCondition,
    pub trigger_value: i64,
    pub action: EscalationAction,
    pub escalation_target: Option<String>,
}

impl CreateRuleRequest {
    #[must_use]
    pub fn into_input(self) -> CreateEscalationRule {
        CreateEscalationRule {
            rule_name: self.rule_name,
            grievance_type: self.grievance_type,
            priority: self.priority,
            trigger_condition: self.trigger_condition,
            trigger_value: self.trigger_value,
            action: self.action,
            escalation_target: self.escalation_target,
        }
    }
}

/// Body for updating an escalation rule. Absent fields stay unchanged;
/// nullable filters clear on an explicit null.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateRuleRequest {
    pub rule_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub grievance_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<PriorityLevel>)]
    pub priority: Option<Option<PriorityLevel>>,
    pub trigger_condition: Option<TriggerCondition>,
    pub trigger_value: Option<i64>,
    pub action: Option<EscalationAction>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub escalation_target: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl UpdateRuleRequest {
    #[must_use]
    pub fn into_input(self) -> UpdateEscalationRule {
        UpdateEscalationRule {
            rule_name: self.rule_name,
            grievance_type: self.grievance_type,
            priority: self.priority,
            trigger_condition: self.trigger_condition,
            trigger_value: self.trigger_value,
            action: self.action,
            escalation_target: self.escalation_target,
            is_active: self.is_active,
        }
    }
}

/// Body for manually triggering a rule.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TriggerRuleRequest {
    pub grievance_id: i64,
}

/// Query parameters for listing escalation history.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListEscalationEventsQuery {
    pub grievance_id: Option<i64>,
    pub unresolved_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paged escalation history.
#[derive(Debug, Serialize, ToSchema)]
pub struct EscalationEventListResponse {
    pub items: Vec<EscalationEvent>,
    pub limit: i64,
    pub offset: i64,
}

/// Rule list.
#[derive(Debug, Serialize, ToSchema)]
pub struct RuleListResponse {
    pub items: Vec<EscalationRule>,
}

/// Escalation metrics snapshot. Fetching metrics runs an evaluation pass
/// first, so the sweep counters describe the pass that produced the numbers.
#[derive(Debug, Serialize, ToSchema)]
pub struct MetricsResponse {
    pub total_rules: i64,
    pub active_rules: i64,
    pub total_events: i64,
    pub unresolved_events: i64,
    pub evaluated: usize,
    pub matched: usize,
    pub actions_applied: usize,
    pub action_failures: usize,
}

impl From<EscalationMetrics> for MetricsResponse {
    fn from(metrics: EscalationMetrics) -> Self {
        Self {
            total_rules: metrics.total_rules,
            active_rules: metrics.active_rules,
            total_events: metrics.total_events,
            unresolved_events: metrics.unresolved_events,
            evaluated: metrics.sweep.evaluated,
            matched: metrics.sweep.matched,
            actions_applied: metrics.sweep.actions_applied,
            action_failures: metrics.sweep.action_failures,
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinators
// ---------------------------------------------------------------------------

/// Body for registering a coordinator.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCoordinatorRequest {
    pub user_id: i64,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(email(message = "email must be valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "department must not be empty"))]
    pub department: String,
    pub specialization: Option<String>,
    /// Defaults to 10 when omitted.
    pub max_workload: Option<i64>,
}

impl CreateCoordinatorRequest {
    #[must_use]
    pub fn into_input(self) -> CreateCoordinator {
        CreateCoordinator {
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            department: self.department,
            specialization: self.specialization,
            max_workload: self.max_workload.unwrap_or(10),
        }
    }
}

/// Body for updating a coordinator. Absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCoordinatorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub specialization: Option<Option<String>>,
    pub max_workload: Option<i64>,
    pub is_active: Option<bool>,
}

impl UpdateCoordinatorRequest {
    #[must_use]
    pub fn into_input(self) -> UpdateCoordinator {
        UpdateCoordinator {
            name: self.name,
            email: self.email,
            department: self.department,
            specialization: self.specialization,
            max_workload: self.max_workload,
            is_active: self.is_active,
        }
    }
}

/// Live workload of a coordinator.
#[derive(Debug, Serialize, ToSchema)]
pub struct WorkloadResponse {
    pub coordinator_id: i64,
    pub current: i64,
    pub max: i64,
    pub ratio: f64,
}

impl WorkloadResponse {
    #[must_use]
    pub fn new(coordinator_id: i64, workload: Workload) -> Self {
        Self {
            coordinator_id,
            current: workload.current,
            max: workload.max,
            ratio: workload.ratio,
        }
    }
}

/// Generic message body for delete-style responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
