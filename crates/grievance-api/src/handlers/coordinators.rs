//! Coordinator handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use grievance_db::models::Coordinator;

use crate::error::ApiResult;
use crate::models::{
    CreateCoordinatorRequest, MessageResponse, UpdateCoordinatorRequest, WorkloadResponse,
};
use crate::router::ApiState;

/// Register a coordinator.
#[utoipa::path(
    post,
    path = "/api/coordinators",
    tag = "Coordinators",
    request_body = CreateCoordinatorRequest,
    responses(
        (status = 201, description = "Coordinator registered", body = Coordinator),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_coordinator(
    State(state): State<ApiState>,
    Json(body): Json<CreateCoordinatorRequest>,
) -> ApiResult<(StatusCode, Json<Coordinator>)> {
    body.validate()?;
    let coordinator = state
        .coordinator_service
        .create(&body.into_input())
        .await?;
    Ok((StatusCode::CREATED, Json(coordinator)))
}

/// List all coordinators.
#[utoipa::path(
    get,
    path = "/api/coordinators",
    tag = "Coordinators",
    responses((status = 200, description = "All coordinators", body = [Coordinator]))
)]
pub async fn list_coordinators(
    State(state): State<ApiState>,
) -> ApiResult<Json<Vec<Coordinator>>> {
    Ok(Json(state.coordinator_service.list().await?))
}

/// Fetch one coordinator by id.
#[utoipa::path(
    get,
    path = "/api/coordinators/{id}",
    tag = "Coordinators",
    params(("id" = i64, Path, description = "Coordinator ID")),
    responses(
        (status = 200, description = "The coordinator", body = Coordinator),
        (status = 404, description = "Coordinator not found")
    )
)]
pub async fn get_coordinator(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Coordinator>> {
    Ok(Json(state.coordinator_service.get(id).await?))
}

/// Update a coordinator. Absent fields stay unchanged.
#[utoipa::path(
    put,
    path = "/api/coordinators/{id}",
    tag = "Coordinators",
    params(("id" = i64, Path, description = "Coordinator ID")),
    request_body = UpdateCoordinatorRequest,
    responses(
        (status = 200, description = "Updated coordinator", body = Coordinator),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Coordinator not found")
    )
)]
pub async fn update_coordinator(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCoordinatorRequest>,
) -> ApiResult<Json<Coordinator>> {
    let coordinator = state
        .coordinator_service
        .update(id, &body.into_input())
        .await?;
    Ok(Json(coordinator))
}

/// Deactivate a coordinator. The row survives for assignment history, and
/// the workload picker stops considering them.
#[utoipa::path(
    delete,
    path = "/api/coordinators/{id}",
    tag = "Coordinators",
    params(("id" = i64, Path, description = "Coordinator ID")),
    responses(
        (status = 200, description = "Coordinator deactivated", body = MessageResponse),
        (status = 404, description = "Coordinator not found")
    )
)]
pub async fn deactivate_coordinator(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.coordinator_service.deactivate(id).await?;
    Ok(Json(MessageResponse {
        message: format!("Coordinator {id} deactivated"),
    }))
}

/// Fetch a coordinator's live workload. Always computed fresh from active
/// assignments, never cached.
#[utoipa::path(
    get,
    path = "/api/coordinators/{id}/workload",
    tag = "Coordinators",
    params(("id" = i64, Path, description = "Coordinator ID")),
    responses(
        (status = 200, description = "Current workload", body = WorkloadResponse),
        (status = 404, description = "Coordinator not found")
    )
)]
pub async fn get_workload(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<WorkloadResponse>> {
    let workload = state.workload_service.get_workload(id).await?;
    Ok(Json(WorkloadResponse::new(id, workload)))
}
