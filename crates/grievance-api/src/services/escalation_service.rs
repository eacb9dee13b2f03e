//! Escalation rule evaluation and action application.
//!
//! Given a grievance (or the whole open set) and the active rules, determine
//! which rules match and apply their actions. Every match records an
//! escalation event and an `escalated` timeline entry; action failure leaves
//! the event unresolved and never aborts evaluation of the remaining rules.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use grievance_core::{lifecycle, Clock, GrievanceError, Result};
use grievance_db::models::{
    ActivityType, AppendTimelineEntry, Assignment, Coordinator, CreateEscalationRule, Deadline,
    EscalationAction, EscalationEvent, EscalationEventFilter, EscalationRule, Grievance,
    GrievanceStatus, RecordEscalationEvent, Severity, TimelineEntry, TriggerCondition,
    UpdateEscalationRule,
};

use crate::services::WorkloadService;

/// Statistics from one evaluation pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationStats {
    /// Grievances inspected.
    pub evaluated: usize,
    /// Rule matches recorded.
    pub matched: usize,
    /// Actions that applied cleanly.
    pub actions_applied: usize,
    /// Matches whose action failed (event recorded, left unresolved).
    pub action_failures: usize,
}

impl EvaluationStats {
    /// Merge stats from another pass.
    pub fn merge(&mut self, other: &EvaluationStats) {
        self.evaluated += other.evaluated;
        self.matched += other.matched;
        self.actions_applied += other.actions_applied;
        self.action_failures += other.action_failures;
    }
}

/// Aggregate escalation metrics.
#[derive(Debug, Clone, Copy)]
pub struct EscalationMetrics {
    pub total_rules: i64,
    pub active_rules: i64,
    pub total_events: i64,
    pub unresolved_events: i64,
    pub sweep: EvaluationStats,
}

/// Service for escalation rules, history, and evaluation.
pub struct EscalationService {
    pool: SqlitePool,
    workload_service: Arc<WorkloadService>,
    clock: Arc<dyn Clock>,
}

impl EscalationService {
    #[must_use]
    pub fn new(
        pool: SqlitePool,
        workload_service: Arc<WorkloadService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pool,
            workload_service,
            clock,
        }
    }

    // ---------------------------------------------------------------------------
    // Rule CRUD
    // ---------------------------------------------------------------------------

    pub async fn create_rule(&self, input: &CreateEscalationRule) -> Result<EscalationRule> {
        if input.rule_name.trim().is_empty() {
            return Err(GrievanceError::Validation(
                "rule_name must not be empty".to_string(),
            ));
        }
        if input.trigger_value < 0 {
            return Err(GrievanceError::Validation(
                "trigger_value must not be negative".to_string(),
            ));
        }
        Ok(EscalationRule::create(&self.pool, input, self.clock.now()).await?)
    }

    pub async fn get_rule(&self, id: i64) -> Result<EscalationRule> {
        EscalationRule::find_by_id(&self.pool, id)
            .await?
            .ok_or(GrievanceError::RuleNotFound(id))
    }

    pub async fn list_rules(&self) -> Result<Vec<EscalationRule>> {
        Ok(EscalationRule::list(&self.pool).await?)
    }

    pub async fn update_rule(
        &self,
        id: i64,
        input: &UpdateEscalationRule,
    ) -> Result<EscalationRule> {
        if let Some(trigger_value) = input.trigger_value {
            if trigger_value < 0 {
                return Err(GrievanceError::Validation(
                    "trigger_value must not be negative".to_string(),
                ));
            }
        }
        EscalationRule::update(&self.pool, id, input, self.clock.now())
            .await?
            .ok_or(GrievanceError::RuleNotFound(id))
    }

    pub async fn delete_rule(&self, id: i64) -> Result<()> {
        if EscalationRule::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(GrievanceError::RuleNotFound(id))
        }
    }

    // ---------------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------------

    pub async fn list_events(
        &self,
        filter: &EscalationEventFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EscalationEvent>> {
        Ok(EscalationEvent::list(&self.pool, filter, limit, offset).await?)
    }

    /// Mark an escalation event handled. Set-once; repeated calls keep the
    /// original timestamp.
    pub async fn resolve_event(&self, id: i64) -> Result<EscalationEvent> {
        EscalationEvent::resolve(&self.pool, id, self.clock.now())
            .await?
            .ok_or(GrievanceError::EscalationEventNotFound(id))
    }

    // ---------------------------------------------------------------------------
    // Evaluation
    // ---------------------------------------------------------------------------

    /// Evaluate all active rules against one grievance.
    ///
    /// Matching rules apply independently; each writes its own event. A rule
    /// with an unresolved event for this grievance is skipped so repeated
    /// sweeps do not stack duplicates.
    #[instrument(skip(self))]
    pub async fn evaluate_grievance(&self, grievance_id: i64) -> Result<EvaluationStats> {
        let mut stats = EvaluationStats {
            evaluated: 1,
            ..EvaluationStats::default()
        };

        let rules = EscalationRule::list_active(&self.pool).await?;
        for rule in &rules {
            // Re-read each iteration: a previous action may have changed
            // status or priority, or pushed the case into a terminal state.
            let Some(grievance) = Grievance::find_by_id(&self.pool, grievance_id).await? else {
                return Err(GrievanceError::GrievanceNotFound(grievance_id));
            };
            if grievance.status.is_terminal() {
                break;
            }

            if !self.rule_matches(rule, &grievance).await? {
                continue;
            }
            if EscalationEvent::has_unresolved_for_rule(&self.pool, grievance.id, rule.id).await? {
                continue;
            }

            stats.matched += 1;
            match self.apply_rule(rule, &grievance, None).await? {
                ActionOutcome::Applied => stats.actions_applied += 1,
                ActionOutcome::Failed => stats.action_failures += 1,
            }
        }

        Ok(stats)
    }

    /// Evaluate every open grievance against the active rules.
    #[instrument(skip(self))]
    pub async fn evaluate_all(&self) -> Result<EvaluationStats> {
        let mut stats = EvaluationStats::default();
        let open = Grievance::list_open(&self.pool).await?;
        for grievance in open {
            let pass = self.evaluate_grievance(grievance.id).await?;
            stats.merge(&pass);
        }
        info!(
            evaluated = stats.evaluated,
            matched = stats.matched,
            actions_applied = stats.actions_applied,
            action_failures = stats.action_failures,
            "Escalation evaluation pass complete"
        );
        Ok(stats)
    }

    /// Apply a `manual` rule to a grievance on explicit operator request.
    pub async fn trigger_manual(
        &self,
        rule_id: i64,
        grievance_id: i64,
        actor_id: i64,
    ) -> Result<EscalationEvent> {
        let rule = self.get_rule(rule_id).await?;
        if rule.trigger_condition != TriggerCondition::Manual || !rule.is_active {
            return Err(GrievanceError::RuleNotTriggerable(rule_id));
        }
        let grievance = Grievance::find_by_id(&self.pool, grievance_id)
            .await?
            .ok_or(GrievanceError::GrievanceNotFound(grievance_id))?;
        if grievance.status.is_terminal() {
            return Err(GrievanceError::Validation(format!(
                "Grievance {grievance_id} is already in a terminal status"
            )));
        }

        self.apply_rule(&rule, &grievance, Some(actor_id)).await?;

        // The freshly recorded event is the newest for this grievance.
        let events = EscalationEvent::list(
            &self.pool,
            &EscalationEventFilter {
                grievance_id: Some(grievance_id),
                unresolved_only: false,
            },
            1,
            0,
        )
        .await?;
        events
            .into_iter()
            .next()
            .ok_or(GrievanceError::EscalationEventNotFound(grievance_id))
    }

    /// Run an evaluation pass and report aggregate metrics.
    ///
    /// Fetching metrics intentionally evaluates first: with no background
    /// sweep configured, the admin metrics view is one of the points where
    /// time-based rules get a chance to fire.
    pub async fn metrics(&self) -> Result<EscalationMetrics> {
        let sweep = self.evaluate_all().await?;
        let rules = EscalationRule::list(&self.pool).await?;
        let active_rules = rules.iter().filter(|r| r.is_active).count() as i64;
        Ok(EscalationMetrics {
            total_rules: rules.len() as i64,
            active_rules,
            total_events: EscalationEvent::count(&self.pool).await?,
            unresolved_events: EscalationEvent::count_unresolved(&self.pool).await?,
            sweep,
        })
    }

    // ---------------------------------------------------------------------------
    // Matching and actions
    // ---------------------------------------------------------------------------

    async fn rule_matches(&self, rule: &EscalationRule, grievance: &Grievance) -> Result<bool> {
        if !rule.filters_admit(grievance) {
            return Ok(false);
        }
        let now = self.clock.now();
        let matched = match rule.trigger_condition {
            TriggerCondition::TimeExceeded => grievance.age_days(now) >= rule.trigger_value,
            TriggerCondition::StatusUnchanged => {
                grievance.days_since_status_change(now) >= rule.trigger_value
            }
            TriggerCondition::DeadlineMissed => {
                Deadline::any_missed_for_grievance(&self.pool, grievance.id, now).await?
            }
            TriggerCondition::Manual => false,
        };
        Ok(matched)
    }

    /// Record the match and attempt the action. The event and timeline entry
    /// commit even when the action itself fails; the failure is logged and
    /// the event stays unresolved for an operator to pick up.
    async fn apply_rule(
        &self,
        rule: &EscalationRule,
        grievance: &Grievance,
        actor_id: Option<i64>,
    ) -> Result<ActionOutcome> {
        let now = self.clock.now();
        let severity = Severity::from_priority(grievance.priority);

        // The workload pick reads through the pool, so it must complete
        // before the transaction takes its connection.
        let assignee = match rule.action {
            EscalationAction::Reassign => {
                let department = grievance.department.as_deref().unwrap_or("general");
                match self.workload_service.pick_assignee(department).await {
                    Ok(coordinator) => Some(coordinator),
                    Err(GrievanceError::NoCoordinatorAvailable(_)) => None,
                    Err(err) => return Err(err),
                }
            }
            _ => None,
        };

        let mut tx = self.pool.begin().await?;

        let action_result = self
            .apply_action(&mut tx, rule, grievance, assignee.as_ref(), actor_id, now)
            .await;

        let outcome = match action_result {
            Ok(()) => ActionOutcome::Applied,
            Err(err @ (GrievanceError::NoCoordinatorAvailable(_)
            | GrievanceError::InvalidTransition { .. })) => {
                warn!(
                    rule_id = rule.id,
                    grievance_id = grievance.id,
                    error = %err,
                    "Escalation action failed; recording event anyway"
                );
                ActionOutcome::Failed
            }
            Err(err) => return Err(err),
        };

        EscalationEvent::record(
            &mut *tx,
            &RecordEscalationEvent {
                grievance_id: grievance.id,
                rule_id: Some(rule.id),
                triggered_by: rule.rule_name.clone(),
                action_taken: action_label(rule.action, outcome),
                severity,
            },
            now,
        )
        .await?;

        TimelineEntry::append(
            &mut *tx,
            &AppendTimelineEntry {
                grievance_id: grievance.id,
                activity_type: ActivityType::Escalated,
                description: format!("Escalation rule '{}' triggered", rule.rule_name),
                actor_id,
                metadata: Some(json!({
                    "rule_id": rule.id,
                    "action": rule.action,
                    "severity": severity,
                })),
            },
            now,
        )
        .await?;

        tx.commit().await?;
        Ok(outcome)
    }

    /// Apply the configured action inside the match transaction.
    ///
    /// Domain failures (no coordinator, transition forbidden) surface as
    /// errors before any write, so a failed action leaves only the event and
    /// timeline rows.
    async fn apply_action(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        rule: &EscalationRule,
        grievance: &Grievance,
        assignee: Option<&Coordinator>,
        actor_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        match rule.action {
            EscalationAction::Reassign => {
                let assignee = assignee.ok_or_else(|| {
                    GrievanceError::NoCoordinatorAvailable(
                        grievance
                            .department
                            .clone()
                            .unwrap_or_else(|| "general".to_string()),
                    )
                })?;
                Assignment::reassign(&mut **tx, grievance.id, assignee.id, now).await?;
                TimelineEntry::append(
                    &mut **tx,
                    &AppendTimelineEntry {
                        grievance_id: grievance.id,
                        activity_type: ActivityType::Assigned,
                        description: format!("Reassigned to {} by escalation", assignee.name),
                        actor_id,
                        metadata: Some(json!({ "coordinator_id": assignee.id })),
                    },
                    now,
                )
                .await?;
            }
            EscalationAction::EscalatePriority => {
                Grievance::set_priority(&mut **tx, grievance.id, grievance.priority.escalated())
                    .await?;
            }
            EscalationAction::AutoResolve => {
                lifecycle::validate_transition(grievance.status, GrievanceStatus::Resolved)?;
                Grievance::set_status(
                    &mut **tx,
                    grievance.id,
                    GrievanceStatus::Resolved,
                    Some(now),
                    now,
                )
                .await?;
                TimelineEntry::append(
                    &mut **tx,
                    &AppendTimelineEntry {
                        grievance_id: grievance.id,
                        activity_type: ActivityType::StatusChanged,
                        description: format!("Auto-resolved by rule '{}'", rule.rule_name),
                        actor_id,
                        metadata: Some(json!({
                            "from": grievance.status,
                            "to": GrievanceStatus::Resolved,
                        })),
                    },
                    now,
                )
                .await?;
            }
            EscalationAction::NotifySupervisor => {
                // Dispatch is an external collaborator; the event row is the
                // notification record.
                info!(
                    grievance_id = grievance.id,
                    target = rule.escalation_target.as_deref().unwrap_or("supervisor"),
                    "Supervisor notification recorded"
                );
            }
        }
        Ok(())
    }
}

/// Whether a matched rule's action applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionOutcome {
    Applied,
    Failed,
}

fn action_label(action: EscalationAction, outcome: ActionOutcome) -> String {
    let base = match action {
        EscalationAction::Reassign => "reassign",
        EscalationAction::NotifySupervisor => "notify_supervisor",
        EscalationAction::EscalatePriority => "escalate_priority",
        EscalationAction::AutoResolve => "auto_resolve",
    };
    match outcome {
        ActionOutcome::Applied => base.to_string(),
        ActionOutcome::Failed => format!("{base}_failed"),
    }
}
