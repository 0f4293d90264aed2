//! Job store abstraction
//!
//! The scheduler and the control API only talk to jobs through this trait,
//! so the in-memory table can be swapped for a durable backend without
//! touching either of them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::job::{Job, JobStateError, JobStatus};
use crate::domain::profile::LoadProfile;
use crate::domain::result::RequestResult;
use crate::dto::job::{JobPoll, JobSummary};

/// Store error type
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job {0} not found")]
    NotFound(Uuid),

    #[error("job {id}: {source}")]
    InvalidState {
        id: Uuid,
        #[source]
        source: JobStateError,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Table of jobs keyed by id
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Creates a `Running` job with a fresh, unused id
    async fn create(&self, profile: LoadProfile) -> Result<Job, StoreError>;

    /// Returns a snapshot of the job
    async fn get(&self, id: Uuid) -> Result<Option<Job>, StoreError>;

    /// Appends a settled wave and returns the new progress
    ///
    /// The wave that brings progress to the job's total also moves it to
    /// `Completed` within the same update.
    async fn append_results(
        &self,
        id: Uuid,
        results: Vec<RequestResult>,
    ) -> Result<usize, StoreError>;

    /// Moves the job into a terminal status
    async fn finish(
        &self,
        id: Uuid,
        status: JobStatus,
        error: Option<String>,
    ) -> Result<(), StoreError>;

    /// Returns the unseen slice of results and advances the delivery cursor
    async fn poll(&self, id: Uuid) -> Result<Option<JobPoll>, StoreError>;

    /// Summaries of every retained job, newest first
    async fn list(&self) -> Result<Vec<JobSummary>, StoreError>;

    /// Removes terminal jobs that finished before `cutoff`
    ///
    /// Running jobs are never removed. Returns the number evicted.
    async fn evict_finished_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;
}
