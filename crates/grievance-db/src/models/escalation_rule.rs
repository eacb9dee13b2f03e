//! Escalation rule model.
//!
//! Rules are user-configured conditions matched against a grievance's age,
//! status history, and deadlines. Only active rules are evaluated; matching
//! rules apply independently of each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{EscalationAction, Grievance, PriorityLevel, TriggerCondition};

/// A configured escalation rule.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EscalationRule {
    /// Unique identifier.
    pub id: i64,

    /// Display name.
    pub rule_name: String,

    /// Optional grievance-type filter; applies only when set.
    pub grievance_type: Option<String>,

    /// Optional priority filter; applies only when set.
    pub priority: Option<PriorityLevel>,

    /// What makes this rule match.
    pub trigger_condition: TriggerCondition,

    /// Numeric threshold; days for the time-based conditions.
    pub trigger_value: i64,

    /// What happens on match.
    pub action: EscalationAction,

    /// Free-text recipient or role for notification actions.
    pub escalation_target: Option<String>,

    /// Only active rules are evaluated.
    pub is_active: bool,

    /// When the rule was created.
    pub created_at: DateTime<Utc>,

    /// When the rule was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEscalationRule {
    pub rule_name: String,
    pub grievance_type: Option<String>,
    pub priority: Option<PriorityLevel>,
    pub trigger_condition: TriggerCondition,
    pub trigger_value: i64,
    pub action: EscalationAction,
    pub escalation_target: Option<String>,
}

/// Input for updating a rule. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEscalationRule {
    pub rule_name: Option<String>,
    pub grievance_type: Option<Option<String>>,
    pub priority: Option<Option<PriorityLevel>>,
    pub trigger_condition: Option<TriggerCondition>,
    pub trigger_value: Option<i64>,
    pub action: Option<EscalationAction>,
    pub escalation_target: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl EscalationRule {
    /// Whether the rule's optional filters admit this grievance.
    #[must_use]
    pub fn filters_admit(&self, grievance: &Grievance) -> bool {
        if let Some(ref wanted_type) = self.grievance_type {
            if *wanted_type != grievance.grievance_type {
                return false;
            }
        }
        if let Some(wanted_priority) = self.priority {
            if wanted_priority != grievance.priority {
                return false;
            }
        }
        true
    }

    /// Insert a new rule, active by default.
    pub async fn create<'e, E>(
        executor: E,
        input: &CreateEscalationRule,
        now: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as(
            r"
            INSERT INTO escalation_rules (
                rule_name, grievance_type, priority, trigger_condition,
                trigger_value, action, escalation_target, is_active,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            RETURNING *
            ",
        )
        .bind(&input.rule_name)
        .bind(&input.grievance_type)
        .bind(input.priority)
        .bind(input.trigger_condition)
        .bind(input.trigger_value)
        .bind(input.action)
        .bind(&input.escalation_target)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    /// Find a rule by id.
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as("SELECT * FROM escalation_rules WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List every rule, newest first.
    pub async fn list(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM escalation_rules ORDER BY created_at DESC, id DESC")
            .fetch_all(pool)
            .await
    }

    /// List active rules in id order. Evaluation order across rules carries
    /// no first-match semantics; every match applies independently.
    pub async fn list_active<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as("SELECT * FROM escalation_rules WHERE is_active = 1 ORDER BY id ASC")
            .fetch_all(executor)
            .await
    }

    /// Update a rule in place.
    pub async fn update(
        pool: &sqlx::SqlitePool,
        id: i64,
        input: &UpdateEscalationRule,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let rule_name = input.rule_name.clone().unwrap_or(existing.rule_name);
        let grievance_type = input
            .grievance_type
            .clone()
            .unwrap_or(existing.grievance_type);
        let priority = input.priority.unwrap_or(existing.priority);
        let trigger_condition = input
            .trigger_condition
            .unwrap_or(existing.trigger_condition);
        let trigger_value = input.trigger_value.unwrap_or(existing.trigger_value);
        let action = input.action.unwrap_or(existing.action);
        let escalation_target = input
            .escalation_target
            .clone()
            .unwrap_or(existing.escalation_target);
        let is_active = input.is_active.unwrap_or(existing.is_active);

        sqlx::query_as(
            r"
            UPDATE escalation_rules
            SET rule_name = ?, grievance_type = ?, priority = ?,
                trigger_condition = ?, trigger_value = ?, action = ?,
                escalation_target = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            ",
        )
        .bind(&rule_name)
        .bind(&grievance_type)
        .bind(priority)
        .bind(trigger_condition)
        .bind(trigger_value)
        .bind(action)
        .bind(&escalation_target)
        .bind(is_active)
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Delete a rule.
    pub async fn delete(pool: &sqlx::SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM escalation_rules WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GrievanceStatus;

    fn rule(grievance_type: Option<&str>, priority: Option<PriorityLevel>) -> EscalationRule {
        let now = Utc::now();
        EscalationRule {
            id: 1,
            rule_name: "stale cases".to_string(),
            grievance_type: grievance_type.map(str::to_string),
            priority,
            trigger_condition: TriggerCondition::TimeExceeded,
            trigger_value: 3,
            action: EscalationAction::NotifySupervisor,
            escalation_target: Some("dean".to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn grievance(grievance_type: &str, priority: PriorityLevel) -> Grievance {
        let now = Utc::now();
        Grievance {
            id: 9,
            student_id: 2,
            grievance_type: grievance_type.to_string(),
            subcategory: None,
            description: "x".to_string(),
            priority,
            status: GrievanceStatus::Submitted,
            department: None,
            file_path: None,
            submitted_at: now,
            resolved_at: None,
            status_changed_at: now,
        }
    }

    #[test]
    fn test_null_filters_admit_everything() {
        let rule = rule(None, None);
        assert!(rule.filters_admit(&grievance("academic", PriorityLevel::Low)));
        assert!(rule.filters_admit(&grievance("hostel", PriorityLevel::Urgent)));
    }

    #[test]
    fn test_type_filter_narrows() {
        let rule = rule(Some("academic"), None);
        assert!(rule.filters_admit(&grievance("academic", PriorityLevel::Low)));
        assert!(!rule.filters_admit(&grievance("hostel", PriorityLevel::Low)));
    }

    #[test]
    fn test_priority_filter_narrows() {
        let rule = rule(None, Some(PriorityLevel::High));
        assert!(rule.filters_admit(&grievance("academic", PriorityLevel::High)));
        assert!(!rule.filters_admit(&grievance("academic", PriorityLevel::Low)));
    }
}
