//! Grievance lifecycle orchestration.
//!
//! Mutations run as a read-validate-write cycle in a single transaction on
//! the single-writer pool, so the timeline entry's `{from, to}` metadata can
//! never record a stale `from` status.

use std::sync::Arc;

use serde_json::json;
use sqlx::SqlitePool;
use tracing::{instrument, warn};

use grievance_core::{lifecycle, Clock, GrievanceError, Result};
use grievance_db::models::{
    ActivityType, AppendTimelineEntry, Assignment, Coordinator, CreateGrievance, Grievance,
    GrievanceFilter, GrievanceStatus, TimelineEntry,
};

use crate::services::{EscalationService, WorkloadService};

/// Service for grievance CRUD and lifecycle transitions.
pub struct GrievanceService {
    pool: SqlitePool,
    escalation_service: Arc<EscalationService>,
    workload_service: Arc<WorkloadService>,
    clock: Arc<dyn Clock>,
}

impl GrievanceService {
    #[must_use]
    pub fn new(
        pool: SqlitePool,
        escalation_service: Arc<EscalationService>,
        workload_service: Arc<WorkloadService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pool,
            escalation_service,
            workload_service,
            clock,
        }
    }

    /// Submit a new grievance. Creates the record in `submitted` and appends
    /// the `created` timeline entry in the same transaction.
    #[instrument(skip(self, input), fields(student_id = input.student_id))]
    pub async fn submit(&self, input: &CreateGrievance, actor_id: i64) -> Result<Grievance> {
        if input.description.trim().is_empty() {
            return Err(GrievanceError::Validation(
                "description must not be empty".to_string(),
            ));
        }
        if input.grievance_type.trim().is_empty() {
            return Err(GrievanceError::Validation(
                "grievance_type must not be empty".to_string(),
            ));
        }

        let now = self.clock.now();
        let mut tx = self.pool.begin().await?;

        let grievance = Grievance::create(&mut *tx, input, now).await?;
        TimelineEntry::append(
            &mut *tx,
            &AppendTimelineEntry {
                grievance_id: grievance.id,
                activity_type: ActivityType::Created,
                description: "Grievance submitted".to_string(),
                actor_id: Some(actor_id),
                metadata: None,
            },
            now,
        )
        .await?;

        tx.commit().await?;
        Ok(grievance)
    }

    pub async fn get(&self, id: i64) -> Result<Grievance> {
        Grievance::find_by_id(&self.pool, id)
            .await?
            .ok_or(GrievanceError::GrievanceNotFound(id))
    }

    pub async fn list(
        &self,
        filter: &GrievanceFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Grievance>, i64)> {
        let items = Grievance::list(&self.pool, filter, limit, offset).await?;
        let total = Grievance::count(&self.pool, filter).await?;
        Ok((items, total))
    }

    pub async fn timeline(&self, id: i64) -> Result<Vec<TimelineEntry>> {
        // Existence check keeps a missing grievance a 404 rather than an
        // empty list.
        self.get(id).await?;
        Ok(TimelineEntry::list_for_grievance(&self.pool, id).await?)
    }

    /// Change a grievance's status.
    ///
    /// Enforces the forward lifecycle graph, sets `resolved_at` on the first
    /// transition into resolved, and appends exactly one `status_changed`
    /// timeline entry with `{from, to}` metadata. Escalation rules are then
    /// evaluated best-effort: an evaluation failure is logged and swallowed,
    /// never rolled into the caller's result.
    #[instrument(skip(self, comment))]
    pub async fn update_status(
        &self,
        id: i64,
        new_status: GrievanceStatus,
        actor_id: i64,
        comment: Option<String>,
    ) -> Result<Grievance> {
        let now = self.clock.now();
        let mut tx = self.pool.begin().await?;

        let grievance = Grievance::find_by_id(&mut *tx, id)
            .await?
            .ok_or(GrievanceError::GrievanceNotFound(id))?;

        lifecycle::validate_transition(grievance.status, new_status)?;

        let resolved_at = (new_status == GrievanceStatus::Resolved).then_some(now);
        let updated = Grievance::set_status(&mut *tx, id, new_status, resolved_at, now)
            .await?
            .ok_or(GrievanceError::GrievanceNotFound(id))?;

        TimelineEntry::append(
            &mut *tx,
            &AppendTimelineEntry {
                grievance_id: id,
                activity_type: ActivityType::StatusChanged,
                description: comment
                    .unwrap_or_else(|| format!("Status changed to {}", new_status.as_str())),
                actor_id: Some(actor_id),
                metadata: Some(json!({
                    "from": grievance.status,
                    "to": new_status,
                })),
            },
            now,
        )
        .await?;

        tx.commit().await?;

        if let Err(err) = self.escalation_service.evaluate_grievance(id).await {
            warn!(
                grievance_id = id,
                error = %err,
                "Escalation evaluation after status update failed"
            );
        }

        Ok(updated)
    }

    /// Assign a grievance to a coordinator.
    ///
    /// Without an explicit coordinator, picks the least-loaded active one in
    /// the grievance's department. The deactivate/activate pair and the
    /// timeline entry commit atomically.
    #[instrument(skip(self))]
    pub async fn assign(
        &self,
        id: i64,
        coordinator_id: Option<i64>,
        actor_id: i64,
    ) -> Result<Assignment> {
        let grievance = self.get(id).await?;
        if grievance.status.is_closed() {
            return Err(GrievanceError::Validation(format!(
                "Grievance {id} is closed and cannot be assigned"
            )));
        }

        let coordinator = match coordinator_id {
            Some(coordinator_id) => Coordinator::find_by_id(&self.pool, coordinator_id)
                .await?
                .ok_or(GrievanceError::CoordinatorNotFound(coordinator_id))?,
            None => {
                let department = grievance.department.as_deref().unwrap_or("general");
                self.workload_service.pick_assignee(department).await?
            }
        };

        let now = self.clock.now();
        let mut tx = self.pool.begin().await?;

        let assignment = Assignment::reassign(&mut tx, id, coordinator.id, now).await?;
        TimelineEntry::append(
            &mut *tx,
            &AppendTimelineEntry {
                grievance_id: id,
                activity_type: ActivityType::Assigned,
                description: format!("Assigned to {}", coordinator.name),
                actor_id: Some(actor_id),
                metadata: Some(json!({ "coordinator_id": coordinator.id })),
            },
            now,
        )
        .await?;

        tx.commit().await?;
        Ok(assignment)
    }
}
