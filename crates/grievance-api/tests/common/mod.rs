//! Shared fixtures for service-level tests.
//!
//! Every test gets its own in-memory SQLite database with migrations applied
//! and a frozen clock it advances by hand.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;

use grievance_api::ApiState;
use grievance_core::FixedClock;
use grievance_db::models::{
    Coordinator, CreateCoordinator, CreateDeadline, CreateEscalationRule, CreateGrievance,
    Deadline, EscalationAction, EscalationEvent, EscalationEventFilter, Grievance, GrievanceStatus,
    PriorityLevel, TriggerCondition,
};

pub const ACTOR_ID: i64 = 7;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub async fn setup() -> (ApiState, FixedClock, SqlitePool) {
    let pool = grievance_db::connect_in_memory()
        .await
        .expect("in-memory pool");
    grievance_db::run_migrations(&pool)
        .await
        .expect("migrations apply");
    let clock = FixedClock::new(start_time());
    let state = ApiState::new(pool.clone(), Arc::new(clock.clone()));
    (state, clock, pool)
}

pub async fn submit(state: &ApiState, priority: PriorityLevel) -> Grievance {
    submit_in_department(state, priority, Some("academic")).await
}

pub async fn submit_in_department(
    state: &ApiState,
    priority: PriorityLevel,
    department: Option<&str>,
) -> Grievance {
    state
        .grievance_service
        .submit(
            &CreateGrievance {
                student_id: 42,
                grievance_type: "academic".to_string(),
                subcategory: Some("grading".to_string()),
                description: "Final exam grade does not match the published rubric".to_string(),
                priority,
                department: department.map(str::to_string),
                file_path: None,
            },
            ACTOR_ID,
        )
        .await
        .expect("submit grievance")
}

/// Drive a grievance through a sequence of status changes.
pub async fn advance_to(state: &ApiState, id: i64, path: &[GrievanceStatus]) -> Grievance {
    let mut grievance = None;
    for status in path {
        grievance = Some(
            state
                .grievance_service
                .update_status(id, *status, ACTOR_ID, None)
                .await
                .expect("status transition"),
        );
    }
    grievance.expect("at least one transition")
}

pub async fn add_coordinator(
    state: &ApiState,
    user_id: i64,
    name: &str,
    department: &str,
    max_workload: i64,
) -> Coordinator {
    state
        .coordinator_service
        .create(&CreateCoordinator {
            user_id,
            name: name.to_string(),
            email: format!("{}@university.edu", name.to_lowercase().replace(' ', ".")),
            department: department.to_string(),
            specialization: None,
            max_workload,
        })
        .await
        .expect("create coordinator")
}

pub fn rule(
    name: &str,
    trigger_condition: TriggerCondition,
    trigger_value: i64,
    action: EscalationAction,
) -> CreateEscalationRule {
    CreateEscalationRule {
        rule_name: name.to_string(),
        grievance_type: None,
        priority: None,
        trigger_condition,
        trigger_value,
        action,
        escalation_target: None,
    }
}

pub async fn add_deadline(
    state: &ApiState,
    grievance_id: i64,
    due_at: DateTime<Utc>,
) -> Deadline {
    state
        .deadline_service
        .create(
            &CreateDeadline {
                grievance_id,
                deadline_type: "response".to_string(),
                description: "Initial response to the student".to_string(),
                due_at,
                coordinator_name: None,
            },
            ACTOR_ID,
        )
        .await
        .expect("create deadline")
}

/// All escalation events recorded for one grievance, newest first.
pub async fn events_for(state: &ApiState, grievance_id: i64) -> Vec<EscalationEvent> {
    state
        .escalation_service
        .list_events(
            &EscalationEventFilter {
                grievance_id: Some(grievance_id),
                unresolved_only: false,
            },
            50,
            0,
        )
        .await
        .expect("list events")
}
