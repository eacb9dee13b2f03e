//! Deadline model with derived urgency status.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DeadlineStatus;

/// A per-grievance due date.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Deadline {
    /// Unique identifier.
    pub id: i64,

    /// Owning grievance.
    pub grievance_id: i64,

    /// Kind of deadline, e.g. "initial_response" or "resolution".
    pub deadline_type: String,

    /// What has to happen by the due date.
    pub description: String,

    /// When it is due.
    pub due_at: DateTime<Utc>,

    /// Whether the deadline was met.
    pub is_completed: bool,

    /// Coordinator responsible, when set.
    pub coordinator_name: Option<String>,

    /// When the deadline was created.
    pub created_at: DateTime<Utc>,

    /// When the deadline was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeadline {
    pub grievance_id: i64,
    pub deadline_type: String,
    pub description: String,
    pub due_at: DateTime<Utc>,
    pub coordinator_name: Option<String>,
}

impl Deadline {
    /// Derive the urgency bucket at `now`.
    ///
    /// Pure function of `(due_at, is_completed, now)`; recomputed on every
    /// read because "now" changes continuously. Never cached server-side.
    #[must_use]
    pub fn derived_status(&self, now: DateTime<Utc>) -> DeadlineStatus {
        if self.is_completed {
            return DeadlineStatus::Completed;
        }
        let remaining = self.due_at - now;
        if remaining < Duration::zero() {
            DeadlineStatus::Overdue
        } else if remaining <= Duration::hours(24) {
            DeadlineStatus::Critical
        } else if remaining <= Duration::hours(72) {
            DeadlineStatus::Warning
        } else {
            DeadlineStatus::Normal
        }
    }

    /// Insert a new deadline.
    pub async fn create<'e, E>(
        executor: E,
        input: &CreateDeadline,
        now: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as(
            r"
            INSERT INTO deadlines (
                grievance_id, deadline_type, description, due_at,
                is_completed, coordinator_name, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, 0, ?, ?, ?)
            RETURNING *
            ",
        )
        .bind(input.grievance_id)
        .bind(&input.deadline_type)
        .bind(&input.description)
        .bind(input.due_at)
        .bind(&input.coordinator_name)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    /// Find a deadline by id.
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as("SELECT * FROM deadlines WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List all deadlines, soonest first.
    pub async fn list(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM deadlines ORDER BY due_at ASC, id ASC")
            .fetch_all(pool)
            .await
    }

    /// List deadlines for one grievance, soonest first.
    pub async fn list_for_grievance<'e, E>(
        executor: E,
        grievance_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as(
            r"
            SELECT * FROM deadlines
            WHERE grievance_id = ?
            ORDER BY due_at ASC, id ASC
            ",
        )
        .bind(grievance_id)
        .fetch_all(executor)
        .await
    }

    /// Whether the grievance has any incomplete deadline past its due date.
    pub async fn any_missed_for_grievance<'e, E>(
        executor: E,
        grievance_id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM deadlines
            WHERE grievance_id = ? AND is_completed = 0 AND due_at < ?
            ",
        )
        .bind(grievance_id)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(count > 0)
    }

    /// Move the due date. The reason is recorded in the grievance timeline by
    /// the calling service.
    pub async fn extend<'e, E>(
        executor: E,
        id: i64,
        new_due_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as(
            r"
            UPDATE deadlines
            SET due_at = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            ",
        )
        .bind(new_due_at)
        .bind(now)
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Mark a deadline completed. Idempotent: completing an already-completed
    /// deadline leaves the row unchanged apart from `updated_at`.
    pub async fn complete<'e, E>(
        executor: E,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as(
            r"
            UPDATE deadlines
            SET is_completed = 1,
                updated_at = CASE WHEN is_completed = 1 THEN updated_at ELSE ? END
            WHERE id = ?
            RETURNING *
            ",
        )
        .bind(now)
        .bind(id)
        .fetch_optional(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(due_at: DateTime<Utc>, is_completed: bool) -> Deadline {
        let now = Utc::now();
        Deadline {
            id: 1,
            grievance_id: 1,
            deadline_type: "resolution".to_string(),
            description: "Resolve the case".to_string(),
            due_at,
            is_completed,
            coordinator_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_completed_wins_regardless_of_date() {
        let now = Utc::now();
        let deadline = sample(now - Duration::days(3), true);
        assert_eq!(deadline.derived_status(now), DeadlineStatus::Completed);
    }

    #[test]
    fn test_overdue_when_past_due() {
        let now = Utc::now();
        let deadline = sample(now - Duration::hours(1), false);
        assert_eq!(deadline.derived_status(now), DeadlineStatus::Overdue);
    }

    #[test]
    fn test_critical_within_24_hours() {
        let now = Utc::now();
        let deadline = sample(now + Duration::hours(1), false);
        assert_eq!(deadline.derived_status(now), DeadlineStatus::Critical);
    }

    #[test]
    fn test_warning_within_72_hours() {
        let now = Utc::now();
        let deadline = sample(now + Duration::hours(48), false);
        assert_eq!(deadline.derived_status(now), DeadlineStatus::Warning);
    }

    #[test]
    fn test_normal_beyond_72_hours() {
        let now = Utc::now();
        let deadline = sample(now + Duration::days(5), false);
        assert_eq!(deadline.derived_status(now), DeadlineStatus::Normal);
    }
}
