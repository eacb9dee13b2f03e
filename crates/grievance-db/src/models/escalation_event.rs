//! Escalation event (history) model.
//!
//! Append-only audit trail of rule matches and manual escalations.
//! `resolved_at` is the only mutable column and is set once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Severity;

/// One recorded escalation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EscalationEvent {
    /// Unique identifier.
    pub id: i64,

    /// The grievance that escalated.
    pub grievance_id: i64,

    /// The matching rule, absent for manual escalations without a rule.
    pub rule_id: Option<i64>,

    /// Rule name or actor description that triggered the escalation.
    pub triggered_by: String,

    /// The action that was applied (or attempted).
    pub action_taken: String,

    /// Severity derived from the grievance priority at escalation time.
    pub severity: Severity,

    /// When the escalation fired.
    pub escalated_at: DateTime<Utc>,

    /// When the escalation was acknowledged as handled; set once.
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Input for recording an escalation event.
#[derive(Debug, Clone)]
pub struct RecordEscalationEvent {
    pub grievance_id: i64,
    pub rule_id: Option<i64>,
    pub triggered_by: String,
    pub action_taken: String,
    pub severity: Severity,
}

/// Filter options for listing escalation events.
#[derive(Debug, Clone, Default)]
pub struct EscalationEventFilter {
    pub grievance_id: Option<i64>,
    pub unresolved_only: bool,
}

impl EscalationEvent {
    /// Record a new event.
    pub async fn record<'e, E>(
        executor: E,
        input: &RecordEscalationEvent,
        now: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as(
            r"
            INSERT INTO escalation_events (
                grievance_id, rule_id, triggered_by, action_taken, severity, escalated_at
            )
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            ",
        )
        .bind(input.grievance_id)
        .bind(input.rule_id)
        .bind(&input.triggered_by)
        .bind(&input.action_taken)
        .bind(input.severity)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    /// Find an event by id.
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as("SELECT * FROM escalation_events WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List events, newest first.
    pub async fn list(
        pool: &sqlx::SqlitePool,
        filter: &EscalationEventFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut conditions = vec!["1 = 1"];
        if filter.grievance_id.is_some() {
            conditions.push("grievance_id = ?");
        }
        if filter.unresolved_only {
            conditions.push("resolved_at IS NULL");
        }
        let query = format!(
            "SELECT * FROM escalation_events WHERE {} ORDER BY escalated_at DESC, id DESC LIMIT ? OFFSET ?",
            conditions.join(" AND ")
        );
        let mut q = sqlx::query_as::<_, Self>(&query);
        if let Some(grievance_id) = filter.grievance_id {
            q = q.bind(grievance_id);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Whether a rule already has an unresolved event for a grievance.
    ///
    /// Keeps repeated sweeps from stacking duplicate escalations while the
    /// previous one is still open.
    pub async fn has_unresolved_for_rule<'e, E>(
        executor: E,
        grievance_id: i64,
        rule_id: i64,
    ) -> Result<bool, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM escalation_events
            WHERE grievance_id = ? AND rule_id = ? AND resolved_at IS NULL
            ",
        )
        .bind(grievance_id)
        .bind(rule_id)
        .fetch_one(executor)
        .await?;
        Ok(count > 0)
    }

    /// Mark an event resolved. The column is written once; a second call
    /// leaves the original timestamp in place.
    pub async fn resolve(
        pool: &sqlx::SqlitePool,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            UPDATE escalation_events
            SET resolved_at = COALESCE(resolved_at, ?)
            WHERE id = ?
            RETURNING *
            ",
        )
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Count all events.
    pub async fn count(pool: &sqlx::SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM escalation_events")
            .fetch_one(pool)
            .await
    }

    /// Count events not yet resolved.
    pub async fn count_unresolved(pool: &sqlx::SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM escalation_events WHERE resolved_at IS NULL")
            .fetch_one(pool)
            .await
    }
}
