//! Barrage Runner
//!
//! The job execution engine of the Barrage load generator.
//!
//! Architecture:
//! - Configuration: wave pacing and HTTP client tuning
//! - Services: the request executor and its fingerprinting helpers
//! - Scheduler: wave planning and the per-job batch loop
//!
//! The orchestrator creates one `BatchScheduler` per process and calls
//! `run` once per submitted job, each in its own task.

pub mod cancel;
pub mod config;
pub mod scheduler;
pub mod service;

pub use cancel::CancelToken;
pub use config::RunnerConfig;
pub use scheduler::{BatchScheduler, RunOutcome, SchedulerError};
pub use service::{HttpRequestExecutor, RequestExecutor};
