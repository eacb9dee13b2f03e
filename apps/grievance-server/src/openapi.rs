//! `OpenAPI` documentation and Swagger UI configuration.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::health::{HealthResponse, HealthState, LivenessResponse};
use crate::state::AppState;

use grievance_api::handlers::{coordinators, deadlines, escalation, grievances};
use grievance_api::models as api_models;
use grievance_db::models as db_models;

/// `OpenAPI` documentation for the grievance API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Student Grievance API",
        version = "0.1.0",
        description = "Grievance lifecycle, deadline tracking, and escalation service",
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server")
    ),
    tags(
        (name = "Health", description = "Service health and status"),
        (name = "Grievances", description = "Grievance submission, lifecycle, and assignment"),
        (name = "Deadlines", description = "Deadline tracking with derived urgency statuses"),
        (name = "Escalation", description = "Escalation rules, history, and metrics"),
        (name = "Coordinators", description = "Coordinator registry and workload")
    ),
    paths(
        crate::health::health_handler,
        crate::health::livez_handler,
        crate::health::readyz_handler,
        grievances::submit_grievance,
        grievances::list_grievances,
        grievances::get_grievance,
        grievances::update_status,
        grievances::assign_grievance,
        grievances::get_timeline,
        grievances::list_grievance_deadlines,
        deadlines::create_deadline,
        deadlines::list_deadlines,
        deadlines::get_deadline,
        deadlines::extend_deadline,
        deadlines::complete_deadline,
        escalation::create_rule,
        escalation::list_rules,
        escalation::get_rule,
        escalation::update_rule,
        escalation::delete_rule,
        escalation::trigger_rule,
        escalation::list_history,
        escalation::resolve_event,
        escalation::get_metrics,
        coordinators::create_coordinator,
        coordinators::list_coordinators,
        coordinators::get_coordinator,
        coordinators::update_coordinator,
        coordinators::deactivate_coordinator,
        coordinators::get_workload,
    ),
    components(schemas(
        HealthResponse,
        HealthState,
        LivenessResponse,
        grievance_api::ErrorResponse,
        api_models::SubmitGrievanceRequest,
        api_models::UpdateStatusRequest,
        api_models::AssignGrievanceRequest,
        api_models::GrievanceListResponse,
        api_models::TimelineResponse,
        api_models::AssignmentResponse,
        api_models::CreateDeadlineRequest,
        api_models::ExtendDeadlineRequest,
        api_models::DeadlineResponse,
        api_models::DeadlineListResponse,
        api_models::CreateRuleRequest,
        api_models::UpdateRuleRequest,
        api_models::TriggerRuleRequest,
        api_models::EscalationEventListResponse,
        api_models::RuleListResponse,
        api_models::MetricsResponse,
        api_models::CreateCoordinatorRequest,
        api_models::UpdateCoordinatorRequest,
        api_models::WorkloadResponse,
        api_models::MessageResponse,
        db_models::Grievance,
        db_models::TimelineEntry,
        db_models::Deadline,
        db_models::EscalationRule,
        db_models::EscalationEvent,
        db_models::Coordinator,
        db_models::Assignment,
        db_models::PriorityLevel,
        db_models::GrievanceStatus,
        db_models::ActivityType,
        db_models::TriggerCondition,
        db_models::EscalationAction,
        db_models::Severity,
        db_models::DeadlineStatus,
    ))
)]
pub struct ApiDoc;

/// Swagger UI at `/swagger-ui` with the spec at `/api-doc/openapi.json`.
pub fn swagger_routes() -> Router<AppState> {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_generation() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().expect("Should serialize to JSON");
        assert!(json.contains("Student Grievance API"));
        assert!(json.contains("/health"));
    }

    #[test]
    fn openapi_contains_grievance_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/grievances"));
        assert!(doc.paths.paths.contains_key("/api/grievances/{id}/status"));
        assert!(doc
            .paths
            .paths
            .contains_key("/api/grievances/{id}/deadlines"));
        assert!(doc.paths.paths.contains_key("/api/escalation/rules"));
    }

    #[test]
    fn openapi_has_components() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().unwrap().schemas;
        assert!(schemas.contains_key("Grievance"));
        assert!(schemas.contains_key("EscalationRule"));
        assert!(schemas.contains_key("HealthResponse"));
    }
}
