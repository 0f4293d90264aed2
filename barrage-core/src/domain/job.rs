//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::profile::LoadProfile;
use super::result::RequestResult;

/// Job lifecycle status
///
/// `Running` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Running)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Running => "RUNNING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Rejected job mutation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobStateError {
    #[error("job is already {0}")]
    AlreadyFinished(JobStatus),

    #[error("result id {id} is outside the job's {total} iterations")]
    IdOutOfRange { id: u32, total: u32 },

    #[error("{0} is not a terminal status")]
    NotTerminal(JobStatus),
}

/// A load test and everything it has accumulated so far
///
/// `results` is append-only and kept in wave-settlement order, not in
/// iteration order. Progress is the length of `results`.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub profile: LoadProfile,
    pub status: JobStatus,
    pub results: Vec<RequestResult>,
    pub delivery_cursor: usize,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(id: Uuid, profile: LoadProfile) -> Self {
        Self {
            id,
            profile,
            status: JobStatus::Running,
            results: Vec::new(),
            delivery_cursor: 0,
            error: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn progress(&self) -> usize {
        self.results.len()
    }

    pub fn total(&self) -> u32 {
        self.profile.iterations
    }

    /// Appends a settled wave and returns the new progress
    ///
    /// The wave that brings progress to `total` also completes the job, so
    /// a running job never reports full progress.
    pub fn record_wave(&mut self, wave: Vec<RequestResult>) -> Result<usize, JobStateError> {
        if self.status.is_terminal() {
            return Err(JobStateError::AlreadyFinished(self.status));
        }

        let total = self.total();
        if let Some(result) = wave.iter().find(|r| r.id >= total) {
            return Err(JobStateError::IdOutOfRange {
                id: result.id,
                total,
            });
        }

        self.results.extend(wave);

        // Full progress and COMPLETED become visible together.
        if self.progress() == total as usize {
            self.status = JobStatus::Completed;
            self.finished_at = Some(Utc::now());
        }

        Ok(self.results.len())
    }

    /// Moves the job into a terminal status
    ///
    /// The error message is only kept for `Failed`.
    pub fn finish(&mut self, status: JobStatus, error: Option<String>) -> Result<(), JobStateError> {
        if !status.is_terminal() {
            return Err(JobStateError::NotTerminal(status));
        }
        if self.status.is_terminal() {
            return Err(JobStateError::AlreadyFinished(self.status));
        }

        self.status = status;
        self.error = if status == JobStatus::Failed { error } else { None };
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Returns the results not yet handed to a poller and advances the cursor
    pub fn take_unseen(&mut self) -> Vec<RequestResult> {
        let unseen = self.results[self.delivery_cursor..].to_vec();
        self.delivery_cursor = self.results.len();
        unseen
    }
}
