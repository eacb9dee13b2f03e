//! Background sweep over open grievances.
//!
//! Status updates already evaluate rules inline, but time-based conditions
//! (`time_exceeded`, `status_unchanged`, `deadline_missed`) can start
//! matching while a grievance sits untouched. This job re-evaluates every
//! open grievance on a fixed interval so those rules fire without waiting
//! for the next mutation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::services::{EscalationService, EvaluationStats};

/// Default sweep interval in seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Periodic escalation sweep.
pub struct EscalationSweepJob {
    escalation_service: Arc<EscalationService>,
    interval: Duration,
}

impl EscalationSweepJob {
    #[must_use]
    pub fn new(escalation_service: Arc<EscalationService>) -> Self {
        Self {
            escalation_service,
            interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }

    /// Override the sweep interval. Clamped to at least one second.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_secs(1));
        self
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single sweep cycle over all open grievances.
    #[instrument(skip(self))]
    pub async fn poll(&self) -> grievance_core::Result<EvaluationStats> {
        let stats = self.escalation_service.evaluate_all().await?;
        if stats.matched > 0 {
            info!(
                evaluated = stats.evaluated,
                matched = stats.matched,
                actions_applied = stats.actions_applied,
                action_failures = stats.action_failures,
                "Escalation sweep applied rules"
            );
        } else {
            debug!(evaluated = stats.evaluated, "Escalation sweep found no matches");
        }
        Ok(stats)
    }

    /// Loop forever, sweeping on the configured interval. Intended to be
    /// spawned as a background task; a failed sweep is logged and the loop
    /// keeps going.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = self.poll().await {
                warn!(error = %err, "Escalation sweep failed");
            }
        }
    }
}
