//! Business logic services for the grievance API.

mod coordinator_service;
mod deadline_service;
mod escalation_service;
mod grievance_service;
mod workload_service;

pub use coordinator_service::CoordinatorService;
pub use deadline_service::DeadlineService;
pub use escalation_service::{EscalationMetrics, EscalationService, EvaluationStats};
pub use grievance_service::GrievanceService;
pub use workload_service::{Workload, WorkloadService};
