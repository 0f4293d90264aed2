//! Core domain types
//!
//! The load profile a caller submits, the per-request results the runner
//! produces, and the job record that ties them together.

pub mod job;
pub mod profile;
pub mod result;
