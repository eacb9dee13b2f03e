//! Coordinator model.
//!
//! `current_workload` is never stored; it is computed from the assignments
//! table on every read so it cannot drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A grievance coordinator.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Coordinator {
    /// Unique identifier.
    pub id: i64,

    /// Backing user account.
    pub user_id: i64,

    /// Display name.
    pub name: String,

    /// Contact email.
    pub email: String,

    /// Department the coordinator serves.
    pub department: String,

    /// Optional specialization within the department.
    pub specialization: Option<String>,

    /// Capacity of concurrently assigned cases.
    pub max_workload: i64,

    /// Inactive coordinators never receive assignments.
    pub is_active: bool,

    /// When the coordinator was registered.
    pub created_at: DateTime<Utc>,

    /// When the coordinator was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCoordinator {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub department: String,
    pub specialization: Option<String>,
    pub max_workload: i64,
}

/// Input for updating a coordinator. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCoordinator {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub specialization: Option<Option<String>>,
    pub max_workload: Option<i64>,
    pub is_active: Option<bool>,
}

impl Coordinator {
    /// Register a new coordinator, active by default.
    pub async fn create<'e, E>(
        executor: E,
        input: &CreateCoordinator,
        now: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as(
            r"
            INSERT INTO coordinators (
                user_id, name, email, department, specialization,
                max_workload, is_active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)
            RETURNING *
            ",
        )
        .bind(input.user_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.department)
        .bind(&input.specialization)
        .bind(input.max_workload)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    /// Find a coordinator by id.
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as("SELECT * FROM coordinators WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List every coordinator.
    pub async fn list(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM coordinators ORDER BY id ASC")
            .fetch_all(pool)
            .await
    }

    /// Active coordinators in one department, id order. Ordering matters:
    /// the assignment picker breaks workload ties by lowest id.
    pub async fn list_active_in_department<'e, E>(
        executor: E,
        department: &str,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as(
            r"
            SELECT * FROM coordinators
            WHERE department = ? AND is_active = 1
            ORDER BY id ASC
            ",
        )
        .bind(department)
        .fetch_all(executor)
        .await
    }

    /// Update a coordinator in place.
    pub async fn update(
        pool: &sqlx::SqlitePool,
        id: i64,
        input: &UpdateCoordinator,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let name = input.name.clone().unwrap_or(existing.name);
        let email = input.email.clone().unwrap_or(existing.email);
        let department = input.department.clone().unwrap_or(existing.department);
        let specialization = input
            .specialization
            .clone()
            .unwrap_or(existing.specialization);
        let max_workload = input.max_workload.unwrap_or(existing.max_workload);
        let is_active = input.is_active.unwrap_or(existing.is_active);

        sqlx::query_as(
            r"
            UPDATE coordinators
            SET name = ?, email = ?, department = ?, specialization = ?,
                max_workload = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            ",
        )
        .bind(&name)
        .bind(&email)
        .bind(&department)
        .bind(&specialization)
        .bind(max_workload)
        .bind(is_active)
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Deactivate a coordinator. Rows are kept for assignment history.
    pub async fn deactivate(
        pool: &sqlx::SqlitePool,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE coordinators
            SET is_active = 0, updated_at = ?
            WHERE id = ?
            ",
        )
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
