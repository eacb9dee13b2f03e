//! Grievance timeline model.
//!
//! Append-only activity log. Entries are never edited or removed; every
//! mutating operation on a grievance appends exactly one entry inside the
//! same transaction as the mutation itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ActivityType;

/// A single timeline entry for a grievance.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TimelineEntry {
    /// Unique identifier.
    pub id: i64,

    /// Owning grievance.
    pub grievance_id: i64,

    /// What happened.
    pub activity_type: ActivityType,

    /// Human-readable description (status-change comments land here).
    pub description: String,

    /// Acting user, when known.
    pub actor_id: Option<i64>,

    /// Structured context, e.g. `{"from": "submitted", "to": "under_review"}`.
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub metadata: Option<serde_json::Value>,

    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
}

/// Input for appending a timeline entry.
#[derive(Debug, Clone)]
pub struct AppendTimelineEntry {
    pub grievance_id: i64,
    pub activity_type: ActivityType,
    pub description: String,
    pub actor_id: Option<i64>,
    pub metadata: Option<serde_json::Value>,
}

impl TimelineEntry {
    /// Append an entry. Callers pass the transaction of the triggering
    /// mutation so the log and the mutation commit together.
    pub async fn append<'e, E>(
        executor: E,
        input: &AppendTimelineEntry,
        now: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as(
            r"
            INSERT INTO grievance_timeline (
                grievance_id, activity_type, description, actor_id, metadata, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            ",
        )
        .bind(input.grievance_id)
        .bind(input.activity_type)
        .bind(&input.description)
        .bind(input.actor_id)
        .bind(&input.metadata)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    /// All entries for a grievance, oldest first.
    pub async fn list_for_grievance<'e, E>(
        executor: E,
        grievance_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as(
            r"
            SELECT * FROM grievance_timeline
            WHERE grievance_id = ?
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(grievance_id)
        .fetch_all(executor)
        .await
    }

}
