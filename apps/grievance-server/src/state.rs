//! Shared application state for health probes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sqlx::SqlitePool;

/// State shared by the health and readiness handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    /// Set during graceful shutdown so the readiness probe drains traffic.
    pub shutting_down: Arc<AtomicBool>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }
}
