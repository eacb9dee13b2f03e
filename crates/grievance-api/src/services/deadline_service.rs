//! Deadline tracking operations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::instrument;

use grievance_core::{Clock, GrievanceError, Result};
use grievance_db::models::{
    ActivityType, AppendTimelineEntry, CreateDeadline, Deadline, Grievance, TimelineEntry,
};

/// Service for deadline creation, extension, and completion.
pub struct DeadlineService {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl DeadlineService {
    #[must_use]
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Create a deadline and record it in the grievance timeline.
    #[instrument(skip(self, input), fields(grievance_id = input.grievance_id))]
    pub async fn create(&self, input: &CreateDeadline, actor_id: i64) -> Result<Deadline> {
        if input.description.trim().is_empty() {
            return Err(GrievanceError::Validation(
                "description must not be empty".to_string(),
            ));
        }
        Grievance::find_by_id(&self.pool, input.grievance_id)
            .await?
            .ok_or(GrievanceError::GrievanceNotFound(input.grievance_id))?;

        let now = self.clock.now();
        let mut tx = self.pool.begin().await?;

        let deadline = Deadline::create(&mut *tx, input, now).await?;
        TimelineEntry::append(
            &mut *tx,
            &AppendTimelineEntry {
                grievance_id: input.grievance_id,
                activity_type: ActivityType::DeadlineSet,
                description: format!("Deadline set: {}", input.description),
                actor_id: Some(actor_id),
                metadata: Some(json!({ "due_at": input.due_at })),
            },
            now,
        )
        .await?;

        tx.commit().await?;
        Ok(deadline)
    }

    pub async fn get(&self, id: i64) -> Result<Deadline> {
        Deadline::find_by_id(&self.pool, id)
            .await?
            .ok_or(GrievanceError::DeadlineNotFound(id))
    }

    pub async fn list(&self) -> Result<Vec<Deadline>> {
        Ok(Deadline::list(&self.pool).await?)
    }

    pub async fn list_for_grievance(&self, grievance_id: i64) -> Result<Vec<Deadline>> {
        Ok(Deadline::list_for_grievance(&self.pool, grievance_id).await?)
    }

    /// Extend a deadline. Requires a non-empty reason, which lands in the
    /// grievance timeline with the new date.
    #[instrument(skip(self, reason))]
    pub async fn extend(
        &self,
        id: i64,
        new_due_at: DateTime<Utc>,
        reason: &str,
        actor_id: i64,
    ) -> Result<Deadline> {
        if reason.trim().is_empty() {
            return Err(GrievanceError::Validation(
                "reason must not be empty".to_string(),
            ));
        }

        let now = self.clock.now();
        let mut tx = self.pool.begin().await?;

        let deadline = Deadline::extend(&mut *tx, id, new_due_at, now)
            .await?
            .ok_or(GrievanceError::DeadlineNotFound(id))?;

        TimelineEntry::append(
            &mut *tx,
            &AppendTimelineEntry {
                grievance_id: deadline.grievance_id,
                activity_type: ActivityType::DeadlineSet,
                description: format!("Deadline extended: {reason}"),
                actor_id: Some(actor_id),
                metadata: Some(json!({ "new_date": new_due_at, "reason": reason })),
            },
            now,
        )
        .await?;

        tx.commit().await?;
        Ok(deadline)
    }

    /// Mark a deadline completed. Completing an already-completed deadline
    /// is a no-op, not an error.
    #[instrument(skip(self))]
    pub async fn complete(&self, id: i64) -> Result<Deadline> {
        Deadline::complete(&self.pool, id, self.clock.now())
            .await?
            .ok_or(GrievanceError::DeadlineNotFound(id))
    }
}
