//! Data Transfer Objects for the control API
//!
//! Request and response bodies exchanged between the orchestrator and its
//! callers (the client crate, the CLI, browser dashboards).

pub mod job;
