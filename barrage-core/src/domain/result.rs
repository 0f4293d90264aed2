//! Per-request result types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestOutcome {
    /// A response was received, whatever its status code
    Completed,
    /// No response: network error, timeout or cancellation
    Failed,
}

/// Measurement of one iteration of a job
///
/// `id` is the iteration index and is only unique within its job.
/// Times are milliseconds; `start_time` is taken from a process-wide
/// monotonic clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResult {
    pub id: u32,
    pub start_time: f64,
    pub duration: f64,
    pub status: u16,
    pub outcome: RequestOutcome,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_timing_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl RequestResult {
    /// Result for a request that received a response
    pub fn completed(
        id: u32,
        start_time: f64,
        duration: f64,
        status: u16,
        response_headers: HashMap<String, String>,
    ) -> Self {
        let server_timing_header = response_headers.get("server-timing").cloned();
        Self {
            id,
            start_time,
            duration,
            status,
            outcome: RequestOutcome::Completed,
            success: (200..300).contains(&status),
            response_headers: Some(response_headers),
            server_timing_header,
            error_message: None,
        }
    }

    /// Result for a request that never received a response
    pub fn failed(id: u32, start_time: f64, duration: f64, message: impl Into<String>) -> Self {
        Self {
            id,
            start_time,
            duration,
            status: 0,
            outcome: RequestOutcome::Failed,
            success: false,
            response_headers: None,
            server_timing_header: None,
            error_message: Some(message.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.outcome == RequestOutcome::Failed
    }
}
