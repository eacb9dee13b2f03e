//! Escalation rule evaluation against a frozen, hand-advanced clock.

mod common;

use chrono::Duration;

use common::{add_coordinator, add_deadline, advance_to, events_for, rule, setup, submit, ACTOR_ID};
use grievance_core::GrievanceError;
use grievance_db::models::{
    ActivityType, EscalationAction, GrievanceStatus, PriorityLevel, Severity, TriggerCondition,
    UpdateEscalationRule,
};

#[tokio::test]
async fn test_time_exceeded_fires_after_age_threshold() {
    let (state, clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::High).await;
    state
        .escalation_service
        .create_rule(&rule(
            "stale after 3 days",
            TriggerCondition::TimeExceeded,
            3,
            EscalationAction::NotifySupervisor,
        ))
        .await
        .unwrap();

    let stats = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(stats.evaluated, 1);
    assert_eq!(stats.matched, 0);

    clock.advance(Duration::days(4));
    let stats = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(stats.matched, 1);
    assert_eq!(stats.actions_applied, 1);
    assert_eq!(stats.action_failures, 0);

    let events = events_for(&state, grievance.id).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].triggered_by, "stale after 3 days");
    assert_eq!(events[0].action_taken, "notify_supervisor");
    assert_eq!(events[0].severity, Severity::High);
    assert!(events[0].resolved_at.is_none());

    let timeline = state
        .grievance_service
        .timeline(grievance.id)
        .await
        .unwrap();
    assert_eq!(
        timeline.last().unwrap().activity_type,
        ActivityType::Escalated
    );
}

#[tokio::test]
async fn test_matched_rule_skipped_while_event_unresolved() {
    let (state, clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::Medium).await;
    state
        .escalation_service
        .create_rule(&rule(
            "stale",
            TriggerCondition::TimeExceeded,
            2,
            EscalationAction::NotifySupervisor,
        ))
        .await
        .unwrap();

    clock.advance(Duration::days(3));
    let first = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(first.matched, 1);

    // Unresolved event for this rule suppresses a duplicate.
    let second = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(second.matched, 0);
    assert_eq!(events_for(&state, grievance.id).await.len(), 1);

    let event_id = events_for(&state, grievance.id).await[0].id;
    state.escalation_service.resolve_event(event_id).await.unwrap();

    let third = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(third.matched, 1);
    assert_eq!(events_for(&state, grievance.id).await.len(), 2);
}

#[tokio::test]
async fn test_resolve_event_keeps_original_timestamp() {
    let (state, clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::Medium).await;
    state
        .escalation_service
        .create_rule(&rule(
            "stale",
            TriggerCondition::TimeExceeded,
            1,
            EscalationAction::NotifySupervisor,
        ))
        .await
        .unwrap();
    clock.advance(Duration::days(2));
    state.escalation_service.evaluate_all().await.unwrap();

    let event_id = events_for(&state, grievance.id).await[0].id;
    let resolved = state.escalation_service.resolve_event(event_id).await.unwrap();
    let first_resolution = resolved.resolved_at.unwrap();

    clock.advance(Duration::hours(6));
    let again = state.escalation_service.resolve_event(event_id).await.unwrap();
    assert_eq!(again.resolved_at, Some(first_resolution));
}

#[tokio::test]
async fn test_terminal_grievances_are_not_evaluated() {
    let (state, clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::Medium).await;
    advance_to(
        &state,
        grievance.id,
        &[
            GrievanceStatus::UnderReview,
            GrievanceStatus::InProgress,
            GrievanceStatus::Resolved,
        ],
    )
    .await;

    state
        .escalation_service
        .create_rule(&rule(
            "stale",
            TriggerCondition::TimeExceeded,
            1,
            EscalationAction::NotifySupervisor,
        ))
        .await
        .unwrap();
    clock.advance(Duration::days(10));

    let stats = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(stats.evaluated, 0);
    assert!(events_for(&state, grievance.id).await.is_empty());
}

#[tokio::test]
async fn test_rule_filters_exclude_non_matching_grievances() {
    let (state, clock, _pool) = setup().await;
    submit(&state, PriorityLevel::Medium).await;

    let mut housing_only = rule(
        "housing backlog",
        TriggerCondition::TimeExceeded,
        1,
        EscalationAction::NotifySupervisor,
    );
    housing_only.grievance_type = Some("housing".to_string());
    state
        .escalation_service
        .create_rule(&housing_only)
        .await
        .unwrap();

    let mut urgent_only = rule(
        "urgent backlog",
        TriggerCondition::TimeExceeded,
        1,
        EscalationAction::NotifySupervisor,
    );
    urgent_only.priority = Some(PriorityLevel::Urgent);
    state
        .escalation_service
        .create_rule(&urgent_only)
        .await
        .unwrap();

    clock.advance(Duration::days(5));
    let stats = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(stats.evaluated, 1);
    assert_eq!(stats.matched, 0);
}

#[tokio::test]
async fn test_escalate_priority_bumps_one_step_and_caps() {
    let (state, clock, _pool) = setup().await;
    let medium = submit(&state, PriorityLevel::Medium).await;
    let urgent = submit(&state, PriorityLevel::Urgent).await;
    state
        .escalation_service
        .create_rule(&rule(
            "bump stale cases",
            TriggerCondition::TimeExceeded,
            2,
            EscalationAction::EscalatePriority,
        ))
        .await
        .unwrap();

    clock.advance(Duration::days(3));
    let stats = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(stats.matched, 2);
    assert_eq!(stats.actions_applied, 2);

    let medium = state.grievance_service.get(medium.id).await.unwrap();
    assert_eq!(medium.priority, PriorityLevel::High);
    let urgent = state.grievance_service.get(urgent.id).await.unwrap();
    assert_eq!(urgent.priority, PriorityLevel::Urgent);
}

#[tokio::test]
async fn test_auto_resolve_from_in_progress() {
    let (state, clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::Low).await;
    advance_to(
        &state,
        grievance.id,
        &[GrievanceStatus::UnderReview, GrievanceStatus::InProgress],
    )
    .await;

    state
        .escalation_service
        .create_rule(&rule(
            "close out idle cases",
            TriggerCondition::TimeExceeded,
            5,
            EscalationAction::AutoResolve,
        ))
        .await
        .unwrap();
    clock.advance(Duration::days(6));

    let stats = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(stats.actions_applied, 1);

    let grievance = state.grievance_service.get(grievance.id).await.unwrap();
    assert_eq!(grievance.status, GrievanceStatus::Resolved);
    assert!(grievance.resolved_at.is_some());

    let events = events_for(&state, grievance.id).await;
    assert_eq!(events[0].action_taken, "auto_resolve");
}

#[tokio::test]
async fn test_auto_resolve_failure_is_recorded_not_applied() {
    let (state, clock, _pool) = setup().await;
    // Still in submitted; the lifecycle graph forbids jumping to resolved.
    let grievance = submit(&state, PriorityLevel::Low).await;
    state
        .escalation_service
        .create_rule(&rule(
            "close out idle cases",
            TriggerCondition::TimeExceeded,
            5,
            EscalationAction::AutoResolve,
        ))
        .await
        .unwrap();
    clock.advance(Duration::days(6));

    let stats = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(stats.matched, 1);
    assert_eq!(stats.actions_applied, 0);
    assert_eq!(stats.action_failures, 1);

    let grievance = state.grievance_service.get(grievance.id).await.unwrap();
    assert_eq!(grievance.status, GrievanceStatus::Submitted);

    // The event still lands, flagged as failed and left unresolved.
    let events = events_for(&state, grievance.id).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action_taken, "auto_resolve_failed");
    assert!(events[0].resolved_at.is_none());
}

#[tokio::test]
async fn test_reassign_action_fails_without_coordinator() {
    let (state, clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::Medium).await;
    state
        .escalation_service
        .create_rule(&rule(
            "rebalance stale cases",
            TriggerCondition::TimeExceeded,
            2,
            EscalationAction::Reassign,
        ))
        .await
        .unwrap();
    clock.advance(Duration::days(3));

    let stats = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(stats.action_failures, 1);

    let events = events_for(&state, grievance.id).await;
    assert_eq!(events[0].action_taken, "reassign_failed");
}

#[tokio::test]
async fn test_reassign_action_assigns_in_department() {
    let (state, clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::Medium).await;
    let coordinator = add_coordinator(&state, 100, "Dana Reyes", "academic", 10).await;
    state
        .escalation_service
        .create_rule(&rule(
            "rebalance stale cases",
            TriggerCondition::TimeExceeded,
            2,
            EscalationAction::Reassign,
        ))
        .await
        .unwrap();
    clock.advance(Duration::days(3));

    let stats = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(stats.actions_applied, 1);
    assert_eq!(
        events_for(&state, grievance.id).await[0].action_taken,
        "reassign"
    );

    let workload = state
        .workload_service
        .get_workload(coordinator.id)
        .await
        .unwrap();
    assert_eq!(workload.current, 1);
}

#[tokio::test]
async fn test_status_unchanged_counts_from_last_transition() {
    let (state, clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::Medium).await;

    clock.advance(Duration::days(2));
    advance_to(&state, grievance.id, &[GrievanceStatus::UnderReview]).await;

    state
        .escalation_service
        .create_rule(&rule(
            "no movement",
            TriggerCondition::StatusUnchanged,
            3,
            EscalationAction::NotifySupervisor,
        ))
        .await
        .unwrap();

    // Four days old, but the status changed two days ago.
    clock.advance(Duration::days(2));
    let stats = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(stats.matched, 0);

    clock.advance(Duration::days(1));
    let stats = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(stats.matched, 1);
}

#[tokio::test]
async fn test_deadline_missed_fires_only_for_open_deadlines() {
    let (state, clock, _pool) = setup().await;
    let missed = submit(&state, PriorityLevel::Medium).await;
    let completed = submit(&state, PriorityLevel::Medium).await;

    let due = common::start_time() + Duration::days(1);
    add_deadline(&state, missed.id, due).await;
    let done = add_deadline(&state, completed.id, due).await;
    state.deadline_service.complete(done.id).await.unwrap();

    state
        .escalation_service
        .create_rule(&rule(
            "missed deadline",
            TriggerCondition::DeadlineMissed,
            0,
            EscalationAction::NotifySupervisor,
        ))
        .await
        .unwrap();

    let stats = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(stats.matched, 0);

    clock.advance(Duration::days(2));
    let stats = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(stats.matched, 1);
    assert_eq!(events_for(&state, missed.id).await.len(), 1);
    assert!(events_for(&state, completed.id).await.is_empty());
}

#[tokio::test]
async fn test_manual_rule_never_matches_automatically() {
    let (state, clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::Urgent).await;
    state
        .escalation_service
        .create_rule(&rule(
            "operator escalation",
            TriggerCondition::Manual,
            0,
            EscalationAction::NotifySupervisor,
        ))
        .await
        .unwrap();

    clock.advance(Duration::days(30));
    let stats = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(stats.matched, 0);
    assert!(events_for(&state, grievance.id).await.is_empty());
}

#[tokio::test]
async fn test_trigger_manual_records_event_and_timeline() {
    let (state, _clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::Medium).await;
    let manual = state
        .escalation_service
        .create_rule(&rule(
            "operator escalation",
            TriggerCondition::Manual,
            0,
            EscalationAction::NotifySupervisor,
        ))
        .await
        .unwrap();

    let event = state
        .escalation_service
        .trigger_manual(manual.id, grievance.id, ACTOR_ID)
        .await
        .unwrap();
    assert_eq!(event.grievance_id, grievance.id);
    assert_eq!(event.rule_id, Some(manual.id));
    assert_eq!(event.triggered_by, "operator escalation");

    let timeline = state
        .grievance_service
        .timeline(grievance.id)
        .await
        .unwrap();
    assert_eq!(
        timeline.last().unwrap().activity_type,
        ActivityType::Escalated
    );
}

#[tokio::test]
async fn test_trigger_manual_rejects_automatic_and_inactive_rules() {
    let (state, _clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::Medium).await;

    let automatic = state
        .escalation_service
        .create_rule(&rule(
            "stale",
            TriggerCondition::TimeExceeded,
            3,
            EscalationAction::NotifySupervisor,
        ))
        .await
        .unwrap();
    let err = state
        .escalation_service
        .trigger_manual(automatic.id, grievance.id, ACTOR_ID)
        .await
        .unwrap_err();
    assert!(matches!(err, GrievanceError::RuleNotTriggerable(_)));

    let manual = state
        .escalation_service
        .create_rule(&rule(
            "operator escalation",
            TriggerCondition::Manual,
            0,
            EscalationAction::NotifySupervisor,
        ))
        .await
        .unwrap();
    state
        .escalation_service
        .update_rule(
            manual.id,
            &UpdateEscalationRule {
                is_active: Some(false),
                ..UpdateEscalationRule::default()
            },
        )
        .await
        .unwrap();
    let err = state
        .escalation_service
        .trigger_manual(manual.id, grievance.id, ACTOR_ID)
        .await
        .unwrap_err();
    assert!(matches!(err, GrievanceError::RuleNotTriggerable(_)));
}

#[tokio::test]
async fn test_trigger_manual_rejects_terminal_grievance() {
    let (state, _clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::Medium).await;
    advance_to(
        &state,
        grievance.id,
        &[
            GrievanceStatus::UnderReview,
            GrievanceStatus::InProgress,
            GrievanceStatus::Resolved,
        ],
    )
    .await;

    let manual = state
        .escalation_service
        .create_rule(&rule(
            "operator escalation",
            TriggerCondition::Manual,
            0,
            EscalationAction::NotifySupervisor,
        ))
        .await
        .unwrap();
    let err = state
        .escalation_service
        .trigger_manual(manual.id, grievance.id, ACTOR_ID)
        .await
        .unwrap_err();
    assert!(matches!(err, GrievanceError::Validation(_)));
}

#[tokio::test]
async fn test_inactive_rule_is_skipped_by_evaluation() {
    let (state, clock, _pool) = setup().await;
    submit(&state, PriorityLevel::Medium).await;
    let created = state
        .escalation_service
        .create_rule(&rule(
            "stale",
            TriggerCondition::TimeExceeded,
            1,
            EscalationAction::NotifySupervisor,
        ))
        .await
        .unwrap();
    state
        .escalation_service
        .update_rule(
            created.id,
            &UpdateEscalationRule {
                is_active: Some(false),
                ..UpdateEscalationRule::default()
            },
        )
        .await
        .unwrap();

    clock.advance(Duration::days(5));
    let stats = state.escalation_service.evaluate_all().await.unwrap();
    assert_eq!(stats.matched, 0);
}

#[tokio::test]
async fn test_metrics_runs_a_sweep_before_counting() {
    let (state, clock, _pool) = setup().await;
    submit(&state, PriorityLevel::Medium).await;
    state
        .escalation_service
        .create_rule(&rule(
            "stale",
            TriggerCondition::TimeExceeded,
            2,
            EscalationAction::NotifySupervisor,
        ))
        .await
        .unwrap();
    clock.advance(Duration::days(3));

    let metrics = state.escalation_service.metrics().await.unwrap();
    assert_eq!(metrics.total_rules, 1);
    assert_eq!(metrics.active_rules, 1);
    assert_eq!(metrics.sweep.matched, 1);
    assert_eq!(metrics.total_events, 1);
    assert_eq!(metrics.unresolved_events, 1);
}

#[tokio::test]
async fn test_rule_validation() {
    let (state, _clock, _pool) = setup().await;

    let err = state
        .escalation_service
        .create_rule(&rule(
            "  ",
            TriggerCondition::TimeExceeded,
            3,
            EscalationAction::NotifySupervisor,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, GrievanceError::Validation(_)));

    let err = state
        .escalation_service
        .create_rule(&rule(
            "negative window",
            TriggerCondition::TimeExceeded,
            -1,
            EscalationAction::NotifySupervisor,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, GrievanceError::Validation(_)));
}
