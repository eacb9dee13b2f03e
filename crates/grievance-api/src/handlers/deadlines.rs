//! Deadline handlers.
//!
//! A deadline's urgency status is never stored; every response derives it
//! from `(due_at, is_completed, now)` at read time.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use crate::actor::Actor;
use crate::error::ApiResult;
use crate::models::{
    CreateDeadlineRequest, DeadlineListResponse, DeadlineResponse, ExtendDeadlineRequest,
    ListDeadlinesQuery,
};
use crate::router::ApiState;

/// Create a deadline for a grievance.
#[utoipa::path(
    post,
    path = "/api/deadlines",
    tag = "Deadlines",
    request_body = CreateDeadlineRequest,
    responses(
        (status = 201, description = "Deadline created", body = DeadlineResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Grievance not found")
    )
)]
pub async fn create_deadline(
    State(state): State<ApiState>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<CreateDeadlineRequest>,
) -> ApiResult<(StatusCode, Json<DeadlineResponse>)> {
    body.validate()?;
    let deadline = state
        .deadline_service
        .create(&body.into_input(), actor.id)
        .await?;
    let now = state.clock.now();
    Ok((
        StatusCode::CREATED,
        Json(DeadlineResponse::derive(deadline, now)),
    ))
}

/// List deadlines with derived urgency statuses, optionally scoped to one
/// grievance or to pending deadlines only.
#[utoipa::path(
    get,
    path = "/api/deadlines",
    tag = "Deadlines",
    params(ListDeadlinesQuery),
    responses(
        (status = 200, description = "Deadlines with derived statuses", body = DeadlineListResponse)
    )
)]
pub async fn list_deadlines(
    State(state): State<ApiState>,
    Query(query): Query<ListDeadlinesQuery>,
) -> ApiResult<Json<DeadlineListResponse>> {
    let deadlines = match query.grievance_id {
        Some(grievance_id) => state.deadline_service.list_for_grievance(grievance_id).await?,
        None => state.deadline_service.list().await?,
    };

    let pending_only = query.pending.unwrap_or(false);
    let now = state.clock.now();
    let items = deadlines
        .into_iter()
        .filter(|deadline| !pending_only || !deadline.is_completed)
        .map(|deadline| DeadlineResponse::derive(deadline, now))
        .collect();
    Ok(Json(DeadlineListResponse { items }))
}

/// Fetch one deadline by id.
#[utoipa::path(
    get,
    path = "/api/deadlines/{id}",
    tag = "Deadlines",
    params(("id" = i64, Path, description = "Deadline ID")),
    responses(
        (status = 200, description = "The deadline", body = DeadlineResponse),
        (status = 404, description = "Deadline not found")
    )
)]
pub async fn get_deadline(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeadlineResponse>> {
    let deadline = state.deadline_service.get(id).await?;
    Ok(Json(DeadlineResponse::derive(deadline, state.clock.now())))
}

/// Extend a deadline to a new due date. The reason is required and lands in
/// the grievance timeline.
#[utoipa::path(
    put,
    path = "/api/deadlines/{id}/extend",
    tag = "Deadlines",
    params(("id" = i64, Path, description = "Deadline ID")),
    request_body = ExtendDeadlineRequest,
    responses(
        (status = 200, description = "Extended deadline", body = DeadlineResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Deadline not found")
    )
)]
pub async fn extend_deadline(
    State(state): State<ApiState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(body): Json<ExtendDeadlineRequest>,
) -> ApiResult<Json<DeadlineResponse>> {
    body.validate()?;
    let deadline = state
        .deadline_service
        .extend(id, body.new_due_at, &body.reason, actor.id)
        .await?;
    Ok(Json(DeadlineResponse::derive(deadline, state.clock.now())))
}

/// Mark a deadline completed. Completing twice is a no-op.
#[utoipa::path(
    put,
    path = "/api/deadlines/{id}/complete",
    tag = "Deadlines",
    params(("id" = i64, Path, description = "Deadline ID")),
    responses(
        (status = 200, description = "Completed deadline", body = DeadlineResponse),
        (status = 404, description = "Deadline not found")
    )
)]
pub async fn complete_deadline(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeadlineResponse>> {
    let deadline = state.deadline_service.complete(id).await?;
    Ok(Json(DeadlineResponse::derive(deadline, state.clock.now())))
}
