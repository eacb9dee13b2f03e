//! Coordinator management.

use std::sync::Arc;

use sqlx::SqlitePool;

use grievance_core::{Clock, GrievanceError, Result};
use grievance_db::models::{Coordinator, CreateCoordinator, UpdateCoordinator};

/// Service for coordinator CRUD.
pub struct CoordinatorService {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl CoordinatorService {
    #[must_use]
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    pub async fn create(&self, input: &CreateCoordinator) -> Result<Coordinator> {
        if input.name.trim().is_empty() {
            return Err(GrievanceError::Validation(
                "name must not be empty".to_string(),
            ));
        }
        if input.max_workload < 1 {
            return Err(GrievanceError::Validation(
                "max_workload must be at least 1".to_string(),
            ));
        }
        Ok(Coordinator::create(&self.pool, input, self.clock.now()).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Coordinator> {
        Coordinator::find_by_id(&self.pool, id)
            .await?
            .ok_or(GrievanceError::CoordinatorNotFound(id))
    }

    pub async fn list(&self) -> Result<Vec<Coordinator>> {
        Ok(Coordinator::list(&self.pool).await?)
    }

    pub async fn update(&self, id: i64, input: &UpdateCoordinator) -> Result<Coordinator> {
        if let Some(max_workload) = input.max_workload {
            if max_workload < 1 {
                return Err(GrievanceError::Validation(
                    "max_workload must be at least 1".to_string(),
                ));
            }
        }
        Coordinator::update(&self.pool, id, input, self.clock.now())
            .await?
            .ok_or(GrievanceError::CoordinatorNotFound(id))
    }

    /// Deactivate a coordinator. The row survives for assignment history.
    pub async fn deactivate(&self, id: i64) -> Result<()> {
        if Coordinator::deactivate(&self.pool, id, self.clock.now()).await? {
            Ok(())
        } else {
            Err(GrievanceError::CoordinatorNotFound(id))
        }
    }
}
