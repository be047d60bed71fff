//! Cooperative action scheduler
//!
//! Polls a fixed, insertion-ordered set of subsystems once per pass and
//! reports how long the caller may sleep before the next pass.

pub mod executor;

pub use executor::{Action, Scheduler, SchedulerError, IDLE_DELAY_US, MAX_ACTIONS};
