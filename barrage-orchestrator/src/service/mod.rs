//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services sit between the API handlers and the job store / scheduler.

pub mod job;
pub mod retention;

// Re-export for convenience
pub use job as job_service;
pub use retention as retention_service;
