//! Deadline tracking with urgency derived from a frozen clock.

mod common;

use chrono::Duration;

use common::{add_deadline, setup, start_time, submit, ACTOR_ID};
use grievance_core::{Clock, GrievanceError};
use grievance_db::models::{
    ActivityType, CreateDeadline, DeadlineStatus, PriorityLevel,
};

#[tokio::test]
async fn test_create_requires_existing_grievance() {
    let (state, _clock, _pool) = setup().await;

    let err = state
        .deadline_service
        .create(
            &CreateDeadline {
                grievance_id: 9999,
                deadline_type: "response".to_string(),
                description: "Initial response".to_string(),
                due_at: start_time() + Duration::days(3),
                coordinator_name: None,
            },
            ACTOR_ID,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GrievanceError::GrievanceNotFound(9999)));
}

#[tokio::test]
async fn test_create_appends_timeline_entry() {
    let (state, _clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::Medium).await;

    let deadline = add_deadline(&state, grievance.id, start_time() + Duration::days(3)).await;
    assert_eq!(deadline.grievance_id, grievance.id);
    assert!(!deadline.is_completed);

    let timeline = state
        .grievance_service
        .timeline(grievance.id)
        .await
        .unwrap();
    let entry = timeline.last().unwrap();
    assert_eq!(entry.activity_type, ActivityType::DeadlineSet);
}

#[tokio::test]
async fn test_derived_status_moves_with_the_clock() {
    let (state, clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::Medium).await;
    let deadline = add_deadline(&state, grievance.id, start_time() + Duration::days(5)).await;

    let fetch = |id| state.deadline_service.get(id);

    assert_eq!(
        fetch(deadline.id).await.unwrap().derived_status(clock.now()),
        DeadlineStatus::Normal
    );

    // 48 hours remaining.
    clock.advance(Duration::days(3));
    assert_eq!(
        fetch(deadline.id).await.unwrap().derived_status(clock.now()),
        DeadlineStatus::Warning
    );

    // 12 hours remaining.
    clock.advance(Duration::hours(36));
    assert_eq!(
        fetch(deadline.id).await.unwrap().derived_status(clock.now()),
        DeadlineStatus::Critical
    );

    clock.advance(Duration::days(1));
    assert_eq!(
        fetch(deadline.id).await.unwrap().derived_status(clock.now()),
        DeadlineStatus::Overdue
    );

    // Completion wins over everything, including overdue.
    state.deadline_service.complete(deadline.id).await.unwrap();
    assert_eq!(
        fetch(deadline.id).await.unwrap().derived_status(clock.now()),
        DeadlineStatus::Completed
    );
}

#[tokio::test]
async fn test_extend_requires_a_reason() {
    let (state, _clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::Medium).await;
    let deadline = add_deadline(&state, grievance.id, start_time() + Duration::days(2)).await;

    let err = state
        .deadline_service
        .extend(
            deadline.id,
            start_time() + Duration::days(7),
            "   ",
            ACTOR_ID,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GrievanceError::Validation(_)));
}

#[tokio::test]
async fn test_extend_moves_due_date_and_records_reason() {
    let (state, clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::Medium).await;
    let deadline = add_deadline(&state, grievance.id, start_time() + Duration::days(1)).await;

    // Already overdue before the extension.
    clock.advance(Duration::days(2));
    let new_due = clock.now() + Duration::days(7);
    let extended = state
        .deadline_service
        .extend(deadline.id, new_due, "Student on medical leave", ACTOR_ID)
        .await
        .unwrap();
    assert_eq!(extended.due_at, new_due);
    assert_eq!(extended.derived_status(clock.now()), DeadlineStatus::Normal);

    let timeline = state
        .grievance_service
        .timeline(grievance.id)
        .await
        .unwrap();
    let entry = timeline.last().unwrap();
    assert_eq!(entry.activity_type, ActivityType::DeadlineSet);
    assert!(entry.description.contains("Student on medical leave"));
}

#[tokio::test]
async fn test_complete_is_idempotent() {
    let (state, clock, _pool) = setup().await;
    let grievance = submit(&state, PriorityLevel::Medium).await;
    let deadline = add_deadline(&state, grievance.id, start_time() + Duration::days(2)).await;

    let completed = state.deadline_service.complete(deadline.id).await.unwrap();
    assert!(completed.is_completed);
    let completed_at = completed.updated_at;

    clock.advance(Duration::hours(6));
    let again = state.deadline_service.complete(deadline.id).await.unwrap();
    assert!(again.is_completed);
    assert_eq!(again.updated_at, completed_at);
}

#[tokio::test]
async fn test_missing_deadline_is_not_found() {
    let (state, _clock, _pool) = setup().await;

    let err = state.deadline_service.get(9999).await.unwrap_err();
    assert!(matches!(err, GrievanceError::DeadlineNotFound(9999)));

    let err = state.deadline_service.complete(9999).await.unwrap_err();
    assert!(matches!(err, GrievanceError::DeadlineNotFound(9999)));
}

#[tokio::test]
async fn test_list_for_grievance_is_scoped() {
    let (state, _clock, _pool) = setup().await;
    let first = submit(&state, PriorityLevel::Medium).await;
    let second = submit(&state, PriorityLevel::Medium).await;

    add_deadline(&state, first.id, start_time() + Duration::days(2)).await;
    add_deadline(&state, first.id, start_time() + Duration::days(9)).await;
    add_deadline(&state, second.id, start_time() + Duration::days(4)).await;

    let first_deadlines = state
        .deadline_service
        .list_for_grievance(first.id)
        .await
        .unwrap();
    assert_eq!(first_deadlines.len(), 2);
    assert!(first_deadlines.iter().all(|d| d.grievance_id == first.id));

    let all = state.deadline_service.list().await.unwrap();
    assert_eq!(all.len(), 3);
}
