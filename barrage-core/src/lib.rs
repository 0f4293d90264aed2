//! Barrage Core
//!
//! Core types and abstractions for the Barrage load generator.
//!
//! This crate contains:
//! - Domain types: load profiles, request results and jobs
//! - DTOs: bodies exchanged with the control API
//! - The `JobStore` trait shared by the scheduler and the API

pub mod domain;
pub mod dto;
pub mod store;
