//! HTTP handlers for the grievance API.

pub mod coordinators;
pub mod deadlines;
pub mod escalation;
pub mod grievances;
