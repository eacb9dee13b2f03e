//! Coordinator workload computation.
//!
//! Workload is always recomputed from the assignments table at read time.
//! No cached counter is trusted, so the ratio can never drift from the
//! underlying rows.

use sqlx::SqlitePool;

use grievance_core::{GrievanceError, Result};
use grievance_db::models::{Assignment, Coordinator};

/// A coordinator's load at the moment of the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Workload {
    /// Active assignments right now.
    pub current: i64,
    /// Configured capacity.
    pub max: i64,
    /// `current / max`; infinite when capacity is zero.
    pub ratio: f64,
}

impl Workload {
    fn compute(current: i64, max: i64) -> Self {
        let ratio = if max > 0 {
            current as f64 / max as f64
        } else {
            f64::INFINITY
        };
        Self {
            current,
            max,
            ratio,
        }
    }
}

/// Service for workload reads and assignment picking.
pub struct WorkloadService {
    pool: SqlitePool,
}

impl WorkloadService {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Current workload of one coordinator.
    pub async fn get_workload(&self, coordinator_id: i64) -> Result<Workload> {
        let coordinator = Coordinator::find_by_id(&self.pool, coordinator_id)
            .await?
            .ok_or(GrievanceError::CoordinatorNotFound(coordinator_id))?;

        let current = Assignment::count_active_for_coordinator(&self.pool, coordinator_id).await?;
        Ok(Workload::compute(current, coordinator.max_workload))
    }

    /// Pick the active coordinator in `department` with the lowest workload
    /// ratio. Ties break on lowest id, so repeated calls with unchanged data
    /// are deterministic.
    pub async fn pick_assignee(&self, department: &str) -> Result<Coordinator> {
        let candidates = Coordinator::list_active_in_department(&self.pool, department).await?;
        if candidates.is_empty() {
            return Err(GrievanceError::NoCoordinatorAvailable(
                department.to_string(),
            ));
        }

        let mut best: Option<(Coordinator, f64)> = None;
        for candidate in candidates {
            let current =
                Assignment::count_active_for_coordinator(&self.pool, candidate.id).await?;
            let workload = Workload::compute(current, candidate.max_workload);
            // Candidates arrive in id order; strict comparison keeps the
            // lowest id on ties.
            let better = match &best {
                None => true,
                Some((_, best_ratio)) => workload.ratio < *best_ratio,
            };
            if better {
                best = Some((candidate, workload.ratio));
            }
        }

        best.map(|(coordinator, _)| coordinator)
            .ok_or_else(|| GrievanceError::NoCoordinatorAvailable(department.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_computation() {
        let workload = Workload::compute(5, 10);
        assert_eq!(workload.current, 5);
        assert_eq!(workload.max, 10);
        assert!((workload.ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_capacity_is_infinite_ratio() {
        let workload = Workload::compute(3, 0);
        assert!(workload.ratio.is_infinite());
    }
}
