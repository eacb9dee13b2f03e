//! Grievance record model.
//!
//! The grievance row is the entity whose state machine drives the timeline,
//! deadline, and escalation subsystems. Rows are never deleted by lifecycle
//! operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{GrievanceStatus, PriorityLevel};

/// A student grievance.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Grievance {
    /// Unique identifier, immutable once assigned.
    pub id: i64,

    /// Owning student.
    pub student_id: i64,

    /// Category of the grievance.
    pub grievance_type: String,

    /// Optional subcategory.
    pub subcategory: Option<String>,

    /// Free-text description.
    pub description: String,

    /// Current priority.
    pub priority: PriorityLevel,

    /// Current lifecycle status.
    pub status: GrievanceStatus,

    /// Department handling the case, if known.
    pub department: Option<String>,

    /// Optional attachment path (upload handling is external).
    pub file_path: Option<String>,

    /// Set once at creation.
    pub submitted_at: DateTime<Utc>,

    /// Set once when the grievance first reaches resolved; never cleared.
    pub resolved_at: Option<DateTime<Utc>>,

    /// When the status last changed. Drives `status_unchanged` rule matching.
    pub status_changed_at: DateTime<Utc>,
}

/// Input for creating a grievance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGrievance {
    pub student_id: i64,
    pub grievance_type: String,
    pub subcategory: Option<String>,
    pub description: String,
    pub priority: PriorityLevel,
    pub department: Option<String>,
    pub file_path: Option<String>,
}

/// Filter options for listing grievances.
#[derive(Debug, Clone, Default)]
pub struct GrievanceFilter {
    pub student_id: Option<i64>,
    pub status: Option<GrievanceStatus>,
    pub grievance_type: Option<String>,
    pub priority: Option<PriorityLevel>,
    pub department: Option<String>,
}

impl GrievanceFilter {
    fn where_clause(&self) -> String {
        let mut conditions = vec!["1 = 1".to_string()];
        if self.student_id.is_some() {
            conditions.push("student_id = ?".to_string());
        }
        if self.status.is_some() {
            conditions.push("status = ?".to_string());
        }
        if self.grievance_type.is_some() {
            conditions.push("grievance_type = ?".to_string());
        }
        if self.priority.is_some() {
            conditions.push("priority = ?".to_string());
        }
        if self.department.is_some() {
            conditions.push("department = ?".to_string());
        }
        conditions.join(" AND ")
    }

    fn bind_to<'q, O>(
        &'q self,
        mut query: sqlx::query::QueryAs<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>> {
        if let Some(student_id) = self.student_id {
            query = query.bind(student_id);
        }
        if let Some(status) = self.status {
            query = query.bind(status);
        }
        if let Some(ref grievance_type) = self.grievance_type {
            query = query.bind(grievance_type);
        }
        if let Some(priority) = self.priority {
            query = query.bind(priority);
        }
        if let Some(ref department) = self.department {
            query = query.bind(department);
        }
        query
    }
}

impl Grievance {
    /// Insert a new grievance in the submitted state.
    pub async fn create<'e, E>(
        executor: E,
        input: &CreateGrievance,
        now: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as(
            r"
            INSERT INTO grievances (
                student_id, grievance_type, subcategory, description, priority,
                status, department, file_path, submitted_at, status_changed_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            ",
        )
        .bind(input.student_id)
        .bind(&input.grievance_type)
        .bind(&input.subcategory)
        .bind(&input.description)
        .bind(input.priority)
        .bind(GrievanceStatus::Submitted)
        .bind(&input.department)
        .bind(&input.file_path)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    /// Find a grievance by id.
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as("SELECT * FROM grievances WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List grievances matching a filter, newest first.
    pub async fn list(
        pool: &sqlx::SqlitePool,
        filter: &GrievanceFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT * FROM grievances WHERE {} ORDER BY submitted_at DESC, id DESC LIMIT ? OFFSET ?",
            filter.where_clause()
        );
        let q = sqlx::query_as::<_, Self>(&query);
        filter.bind_to(q).bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count grievances matching a filter.
    pub async fn count(
        pool: &sqlx::SqlitePool,
        filter: &GrievanceFilter,
    ) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM grievances WHERE {}",
            filter.where_clause()
        );
        let q = sqlx::query_scalar::<_, i64>(&query);
        let mut bound = q;
        if let Some(student_id) = filter.student_id {
            bound = bound.bind(student_id);
        }
        if let Some(status) = filter.status {
            bound = bound.bind(status);
        }
        if let Some(ref grievance_type) = filter.grievance_type {
            bound = bound.bind(grievance_type);
        }
        if let Some(priority) = filter.priority {
            bound = bound.bind(priority);
        }
        if let Some(ref department) = filter.department {
            bound = bound.bind(department);
        }
        bound.fetch_one(pool).await
    }

    /// List grievances in a non-terminal status, oldest first.
    ///
    /// Used by the escalation sweep; terminal cases are never rule candidates.
    pub async fn list_open(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM grievances
            WHERE status NOT IN ('resolved', 'rejected', 'closed')
            ORDER BY submitted_at ASC, id ASC
            ",
        )
        .fetch_all(pool)
        .await
    }

    /// Set the status of a grievance.
    ///
    /// `resolved_at` is only ever written through COALESCE, so the first
    /// transition into resolved wins and the column is never cleared.
    pub async fn set_status<'e, E>(
        executor: E,
        id: i64,
        status: GrievanceStatus,
        resolved_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as(
            r"
            UPDATE grievances
            SET status = ?,
                resolved_at = COALESCE(resolved_at, ?),
                status_changed_at = ?
            WHERE id = ?
            RETURNING *
            ",
        )
        .bind(status)
        .bind(resolved_at)
        .bind(now)
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Set the priority of a grievance.
    pub async fn set_priority<'e, E>(
        executor: E,
        id: i64,
        priority: PriorityLevel,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as(
            r"
            UPDATE grievances
            SET priority = ?
            WHERE id = ?
            RETURNING *
            ",
        )
        .bind(priority)
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Age of the grievance in whole days at `now`.
    #[must_use]
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.submitted_at).num_days()
    }

    /// Whole days since the last status change at `now`.
    #[must_use]
    pub fn days_since_status_change(&self, now: DateTime<Utc>) -> i64 {
        (now - self.status_changed_at).num_days()
    }
}
