//! Barrage orchestrator: HTTP control plane for load-generation jobs

pub mod api;
pub mod config;
pub mod repository;
pub mod service;
pub mod state;
