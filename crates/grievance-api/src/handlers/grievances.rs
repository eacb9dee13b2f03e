//! Grievance lifecycle handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use grievance_db::models::{Grievance, GrievanceFilter};

use crate::actor::Actor;
use crate::error::ApiResult;
use crate::models::{
    AssignGrievanceRequest, AssignmentResponse, DeadlineListResponse, DeadlineResponse,
    GrievanceListResponse, ListGrievancesQuery, SubmitGrievanceRequest, TimelineResponse,
    UpdateStatusRequest,
};
use crate::router::ApiState;

/// Submit a new grievance. The record starts in `submitted` with a `created`
/// timeline entry.
#[utoipa::path(
    post,
    path = "/api/grievances",
    tag = "Grievances",
    request_body = SubmitGrievanceRequest,
    responses(
        (status = 201, description = "Grievance submitted", body = Grievance),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing actor identity")
    )
)]
pub async fn submit_grievance(
    State(state): State<ApiState>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<SubmitGrievanceRequest>,
) -> ApiResult<(StatusCode, Json<Grievance>)> {
    body.validate()?;
    let grievance = state
        .grievance_service
        .submit(&body.into_input(), actor.id)
        .await?;
    Ok((StatusCode::CREATED, Json(grievance)))
}

/// List grievances with optional filters, newest first.
#[utoipa::path(
    get,
    path = "/api/grievances",
    tag = "Grievances",
    params(ListGrievancesQuery),
    responses(
        (status = 200, description = "Paged grievances", body = GrievanceListResponse),
        (status = 401, description = "Missing actor identity")
    )
)]
pub async fn list_grievances(
    State(state): State<ApiState>,
    Query(query): Query<ListGrievancesQuery>,
) -> ApiResult<Json<GrievanceListResponse>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let filter = GrievanceFilter {
        student_id: query.student_id,
        status: query.status,
        grievance_type: query.grievance_type,
        priority: query.priority,
        department: query.department,
    };

    let (items, total) = state.grievance_service.list(&filter, limit, offset).await?;
    Ok(Json(GrievanceListResponse {
        items,
        total,
        limit,
        offset,
    }))
}

/// Fetch one grievance by id.
#[utoipa::path(
    get,
    path = "/api/grievances/{id}",
    tag = "Grievances",
    params(("id" = i64, Path, description = "Grievance ID")),
    responses(
        (status = 200, description = "The grievance", body = Grievance),
        (status = 404, description = "Grievance not found")
    )
)]
pub async fn get_grievance(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Grievance>> {
    Ok(Json(state.grievance_service.get(id).await?))
}

/// Change a grievance's status along the forward lifecycle. Disallowed
/// transitions come back as a 409 conflict.
#[utoipa::path(
    put,
    path = "/api/grievances/{id}/status",
    tag = "Grievances",
    params(("id" = i64, Path, description = "Grievance ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated grievance", body = Grievance),
        (status = 404, description = "Grievance not found"),
        (status = 409, description = "Transition not allowed")
    )
)]
pub async fn update_status(
    State(state): State<ApiState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Grievance>> {
    let grievance = state
        .grievance_service
        .update_status(id, body.status, actor.id, body.comment)
        .await?;
    Ok(Json(grievance))
}

/// Assign a grievance to a coordinator. Omit `coordinator_id` to auto-pick
/// the least-loaded active coordinator in the grievance's department.
#[utoipa::path(
    post,
    path = "/api/grievances/{id}/assign",
    tag = "Grievances",
    params(("id" = i64, Path, description = "Grievance ID")),
    request_body = AssignGrievanceRequest,
    responses(
        (status = 200, description = "New active assignment", body = AssignmentResponse),
        (status = 400, description = "No coordinator available"),
        (status = 404, description = "Grievance or coordinator not found")
    )
)]
pub async fn assign_grievance(
    State(state): State<ApiState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(body): Json<AssignGrievanceRequest>,
) -> ApiResult<Json<AssignmentResponse>> {
    let assignment = state
        .grievance_service
        .assign(id, body.coordinator_id, actor.id)
        .await?;
    Ok(Json(AssignmentResponse { assignment }))
}

/// Fetch a grievance's activity timeline, oldest entry first.
#[utoipa::path(
    get,
    path = "/api/grievances/{id}/timeline",
    tag = "Grievances",
    params(("id" = i64, Path, description = "Grievance ID")),
    responses(
        (status = 200, description = "Timeline entries", body = TimelineResponse),
        (status = 404, description = "Grievance not found")
    )
)]
pub async fn get_timeline(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TimelineResponse>> {
    let entries = state.grievance_service.timeline(id).await?;
    Ok(Json(TimelineResponse {
        grievance_id: id,
        entries,
    }))
}

/// List a grievance's deadlines with derived urgency statuses.
#[utoipa::path(
    get,
    path = "/api/grievances/{id}/deadlines",
    tag = "Deadlines",
    params(("id" = i64, Path, description = "Grievance ID")),
    responses(
        (status = 200, description = "Deadlines with derived statuses", body = DeadlineListResponse),
        (status = 404, description = "Grievance not found")
    )
)]
pub async fn list_grievance_deadlines(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeadlineListResponse>> {
    // Existence check keeps a missing grievance a 404.
    state.grievance_service.get(id).await?;

    let now = state.clock.now();
    let items = state
        .deadline_service
        .list_for_grievance(id)
        .await?
        .into_iter()
        .map(|deadline| DeadlineResponse::derive(deadline, now))
        .collect();
    Ok(Json(DeadlineListResponse { items }))
}
