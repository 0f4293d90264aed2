//! Repository Module
//!
//! Storage implementations behind the `JobStore` trait.

pub mod job;

pub use job::InMemoryJobStore;
