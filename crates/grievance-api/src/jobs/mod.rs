//! Background jobs.

mod escalation_sweep_job;

pub use escalation_sweep_job::{EscalationSweepJob, DEFAULT_SWEEP_INTERVAL_SECS};
