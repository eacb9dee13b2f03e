//! HTTP API for the student grievance system.
//!
//! Exposes grievance lifecycle, deadline tracking, escalation rules, and
//! coordinator workload endpoints over axum. State mutations append to the
//! grievance timeline and feed the escalation evaluator.

pub mod actor;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod router;
pub mod services;

pub use actor::{Actor, ActorRole};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use router::{grievance_router, ApiState};
