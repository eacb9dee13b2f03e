//! Persistence layer for the grievance lifecycle service.
//!
//! SQLite via `sqlx`. Each table has a model module with async query methods
//! on the model struct. Timestamps are always bound from the caller's clock,
//! never generated in SQL, so time can be frozen in tests.

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;

pub use error::DbError;
pub use migrations::run_migrations;
pub use pool::{connect, connect_in_memory};
