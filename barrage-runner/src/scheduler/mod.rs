//! Scheduler layer for the runner
//!
//! Turns a job's load profile into waves of requests and records their
//! results and the job's final status in the job store.

pub mod batch;

pub use batch::{BatchScheduler, RunOutcome, SchedulerError, plan_waves};
