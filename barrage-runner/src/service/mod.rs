//! Service layer
//!
//! Request execution and the fingerprinting helpers it relies on.
//! The executor is trait-based so the scheduler can be driven by test
//! doubles.

mod executor;
pub mod fingerprint;

pub use executor::{HttpRequestExecutor, RequestExecutor, monotonic_ms};
