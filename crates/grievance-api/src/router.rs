//! Router configuration for the grievance API.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::SqlitePool;

use grievance_core::Clock;

use crate::actor::actor_middleware;
use crate::handlers::{coordinators, deadlines, escalation, grievances};
use crate::services::{
    CoordinatorService, DeadlineService, EscalationService, GrievanceService, WorkloadService,
};

/// Shared state for all grievance handlers.
#[derive(Clone)]
pub struct ApiState {
    pub grievance_service: Arc<GrievanceService>,
    pub deadline_service: Arc<DeadlineService>,
    pub escalation_service: Arc<EscalationService>,
    pub coordinator_service: Arc<CoordinatorService>,
    pub workload_service: Arc<WorkloadService>,
    pub clock: Arc<dyn Clock>,
}

impl ApiState {
    #[must_use]
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        let workload_service = Arc::new(WorkloadService::new(pool.clone()));
        let escalation_service = Arc::new(EscalationService::new(
            pool.clone(),
            workload_service.clone(),
            clock.clone(),
        ));
        let grievance_service = Arc::new(GrievanceService::new(
            pool.clone(),
            escalation_service.clone(),
            workload_service.clone(),
            clock.clone(),
        ));
        let deadline_service = Arc::new(DeadlineService::new(pool.clone(), clock.clone()));
        let coordinator_service = Arc::new(CoordinatorService::new(pool, clock.clone()));

        Self {
            grievance_service,
            deadline_service,
            escalation_service,
            coordinator_service,
            workload_service,
            clock,
        }
    }
}

/// Build the grievance router. Every route requires actor identity headers.
pub fn grievance_router(pool: SqlitePool, clock: Arc<dyn Clock>) -> Router {
    let state = ApiState::new(pool, clock);

    Router::new()
        // Grievances
        .route("/grievances", post(grievances::submit_grievance))
        .route("/grievances", get(grievances::list_grievances))
        .route("/grievances/:id", get(grievances::get_grievance))
        .route("/grievances/:id/status", put(grievances::update_status))
        .route("/grievances/:id/assign", post(grievances::assign_grievance))
        .route("/grievances/:id/timeline", get(grievances::get_timeline))
        .route(
            "/grievances/:id/deadlines",
            get(grievances::list_grievance_deadlines),
        )
        // Deadlines
        .route("/deadlines", post(deadlines::create_deadline))
        .route("/deadlines", get(deadlines::list_deadlines))
        .route("/deadlines/:id", get(deadlines::get_deadline))
        .route("/deadlines/:id/extend", put(deadlines::extend_deadline))
        .route("/deadlines/:id/complete", put(deadlines::complete_deadline))
        // Escalation rules
        .route("/escalation/rules", post(escalation::create_rule))
        .route("/escalation/rules", get(escalation::list_rules))
        .route("/escalation/rules/:id", get(escalation::get_rule))
        .route("/escalation/rules/:id", put(escalation::update_rule))
        .route("/escalation/rules/:id", delete(escalation::delete_rule))
        .route(
            "/escalation/rules/:id/trigger",
            post(escalation::trigger_rule),
        )
        // Escalation history and metrics
        .route("/escalation/history", get(escalation::list_history))
        .route(
            "/escalation/history/:id/resolve",
            put(escalation::resolve_event),
        )
        .route("/escalation/metrics", get(escalation::get_metrics))
        // Coordinators
        .route("/coordinators", post(coordinators::create_coordinator))
        .route("/coordinators", get(coordinators::list_coordinators))
        .route("/coordinators/:id", get(coordinators::get_coordinator))
        .route("/coordinators/:id", put(coordinators::update_coordinator))
        .route(
            "/coordinators/:id",
            delete(coordinators::deactivate_coordinator),
        )
        .route(
            "/coordinators/:id/workload",
            get(coordinators::get_workload),
        )
        .layer(middleware::from_fn(actor_middleware))
        .with_state(state)
}
