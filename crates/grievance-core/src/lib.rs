//! Domain logic for the grievance lifecycle and escalation model.
//!
//! This crate holds the pieces that are pure with respect to storage: the
//! lifecycle state-machine graph, the clock abstraction, and the domain error
//! type. Services in `grievance-api` orchestrate these against the database.

pub mod clock;
pub mod error;
pub mod lifecycle;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{GrievanceError, Result};
pub use lifecycle::{allowed_transitions, can_transition, validate_transition};
