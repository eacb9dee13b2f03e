//! Escalation rule, history, and metrics handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use grievance_db::models::{EscalationEvent, EscalationEventFilter, EscalationRule};

use crate::actor::Actor;
use crate::error::ApiResult;
use crate::models::{
    CreateRuleRequest, EscalationEventListResponse, ListEscalationEventsQuery, MessageResponse,
    MetricsResponse, RuleListResponse, TriggerRuleRequest, UpdateRuleRequest,
};
use crate::router::ApiState;

/// Create an escalation rule.
#[utoipa::path(
    post,
    path = "/api/escalation/rules",
    tag = "Escalation",
    request_body = CreateRuleRequest,
    responses(
        (status = 201, description = "Rule created", body = EscalationRule),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_rule(
    State(state): State<ApiState>,
    Json(body): Json<CreateRuleRequest>,
) -> ApiResult<(StatusCode, Json<EscalationRule>)> {
    body.validate()?;
    let rule = state
        .escalation_service
        .create_rule(&body.into_input())
        .await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

/// List all escalation rules.
#[utoipa::path(
    get,
    path = "/api/escalation/rules",
    tag = "Escalation",
    responses((status = 200, description = "All rules", body = RuleListResponse))
)]
pub async fn list_rules(State(state): State<ApiState>) -> ApiResult<Json<RuleListResponse>> {
    let items = state.escalation_service.list_rules().await?;
    Ok(Json(RuleListResponse { items }))
}

/// Fetch one rule by id.
#[utoipa::path(
    get,
    path = "/api/escalation/rules/{id}",
    tag = "Escalation",
    params(("id" = i64, Path, description = "Rule ID")),
    responses(
        (status = 200, description = "The rule", body = EscalationRule),
        (status = 404, description = "Rule not found")
    )
)]
pub async fn get_rule(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EscalationRule>> {
    Ok(Json(state.escalation_service.get_rule(id).await?))
}

/// Update a rule. Absent fields stay unchanged.
#[utoipa::path(
    put,
    path = "/api/escalation/rules/{id}",
    tag = "Escalation",
    params(("id" = i64, Path, description = "Rule ID")),
    request_body = UpdateRuleRequest,
    responses(
        (status = 200, description = "Updated rule", body = EscalationRule),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Rule not found")
    )
)]
pub async fn update_rule(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateRuleRequest>,
) -> ApiResult<Json<EscalationRule>> {
    let rule = state
        .escalation_service
        .update_rule(id, &body.into_input())
        .await?;
    Ok(Json(rule))
}

/// Delete a rule. Its recorded events survive for audit.
#[utoipa::path(
    delete,
    path = "/api/escalation/rules/{id}",
    tag = "Escalation",
    params(("id" = i64, Path, description = "Rule ID")),
    responses(
        (status = 200, description = "Rule deleted", body = MessageResponse),
        (status = 404, description = "Rule not found")
    )
)]
pub async fn delete_rule(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.escalation_service.delete_rule(id).await?;
    Ok(Json(MessageResponse {
        message: format!("Escalation rule {id} deleted"),
    }))
}

/// Manually trigger a `manual` rule against a grievance.
#[utoipa::path(
    post,
    path = "/api/escalation/rules/{id}/trigger",
    tag = "Escalation",
    params(("id" = i64, Path, description = "Rule ID")),
    request_body = TriggerRuleRequest,
    responses(
        (status = 200, description = "Recorded escalation event", body = EscalationEvent),
        (status = 400, description = "Rule is not manual, inactive, or grievance is terminal"),
        (status = 404, description = "Rule or grievance not found")
    )
)]
pub async fn trigger_rule(
    State(state): State<ApiState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(body): Json<TriggerRuleRequest>,
) -> ApiResult<Json<EscalationEvent>> {
    let event = state
        .escalation_service
        .trigger_manual(id, body.grievance_id, actor.id)
        .await?;
    Ok(Json(event))
}

/// List escalation history, newest first.
#[utoipa::path(
    get,
    path = "/api/escalation/history",
    tag = "Escalation",
    params(ListEscalationEventsQuery),
    responses(
        (status = 200, description = "Paged escalation events", body = EscalationEventListResponse)
    )
)]
pub async fn list_history(
    State(state): State<ApiState>,
    Query(query): Query<ListEscalationEventsQuery>,
) -> ApiResult<Json<EscalationEventListResponse>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let filter = EscalationEventFilter {
        grievance_id: query.grievance_id,
        unresolved_only: query.unresolved_only.unwrap_or(false),
    };

    let items = state
        .escalation_service
        .list_events(&filter, limit, offset)
        .await?;
    Ok(Json(EscalationEventListResponse {
        items,
        limit,
        offset,
    }))
}

/// Mark an escalation event handled. Resolving twice keeps the original
/// resolution timestamp.
#[utoipa::path(
    put,
    path = "/api/escalation/history/{id}/resolve",
    tag = "Escalation",
    params(("id" = i64, Path, description = "Escalation event ID")),
    responses(
        (status = 200, description = "Resolved event", body = EscalationEvent),
        (status = 404, description = "Event not found")
    )
)]
pub async fn resolve_event(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EscalationEvent>> {
    Ok(Json(state.escalation_service.resolve_event(id).await?))
}

/// Escalation metrics. Runs a fresh evaluation pass over open grievances
/// before counting, so the numbers reflect current rule state.
#[utoipa::path(
    get,
    path = "/api/escalation/metrics",
    tag = "Escalation",
    responses((status = 200, description = "Metrics snapshot", body = MetricsResponse))
)]
pub async fn get_metrics(State(state): State<ApiState>) -> ApiResult<Json<MetricsResponse>> {
    let metrics = state.escalation_service.metrics().await?;
    Ok(Json(MetricsResponse::from(metrics)))
}
