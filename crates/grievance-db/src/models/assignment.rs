//! Assignment model (grievance ↔ coordinator).
//!
//! Invariant: at most one active assignment per grievance, enforced both by a
//! partial unique index and by performing the deactivate/activate pair inside
//! a single transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One assignment of a grievance to a coordinator.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Assignment {
    /// Unique identifier.
    pub id: i64,

    /// The assigned grievance.
    pub grievance_id: i64,

    /// The responsible coordinator.
    pub coordinator_id: i64,

    /// False once reassigned or closed out.
    pub is_active: bool,

    /// When the assignment was made.
    pub assigned_at: DateTime<Utc>,

    /// When the assignment stopped being active.
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl Assignment {
    /// Number of active assignments carried by a coordinator.
    ///
    /// Always computed fresh from the `(coordinator_id, is_active)` index;
    /// no denormalized counter exists to drift.
    pub async fn count_active_for_coordinator<'e, E>(
        executor: E,
        coordinator_id: i64,
    ) -> Result<i64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM assignments
            WHERE coordinator_id = ? AND is_active = 1
            ",
        )
        .bind(coordinator_id)
        .fetch_one(executor)
        .await
    }

    /// Assign a grievance to a coordinator, deactivating any prior active
    /// assignment in the same statement sequence. Callers run this inside a
    /// transaction so concurrent reassignments cannot leave two active rows.
    pub async fn reassign(
        tx: &mut sqlx::SqliteConnection,
        grievance_id: i64,
        coordinator_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query(
            r"
            UPDATE assignments
            SET is_active = 0, deactivated_at = ?
            WHERE grievance_id = ? AND is_active = 1
            ",
        )
        .bind(now)
        .bind(grievance_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query_as(
            r"
            INSERT INTO assignments (grievance_id, coordinator_id, is_active, assigned_at)
            VALUES (?, ?, 1, ?)
            RETURNING *
            ",
        )
        .bind(grievance_id)
        .bind(coordinator_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
    }

    /// Count active assignments for a grievance. Exists for invariant checks
    /// in tests; production code relies on the unique index.
    pub async fn count_active_for_grievance<'e, E>(
        executor: E,
        grievance_id: i64,
    ) -> Result<i64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM assignments
            WHERE grievance_id = ? AND is_active = 1
            ",
        )
        .bind(grievance_id)
        .fetch_one(executor)
        .await
    }
}
