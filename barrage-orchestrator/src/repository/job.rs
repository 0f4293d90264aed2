//! Job Repository
//!
//! Process-local job table. Each job sits behind its own mutex so the
//! scheduler task and pollers running on other worker threads never see
//! a half-applied update; no lock is held across an `.await`.

use async_trait::async_trait;
use barrage_core::domain::job::{Job, JobStatus};
use barrage_core::domain::profile::LoadProfile;
use barrage_core::domain::result::RequestResult;
use barrage_core::dto::job::{JobPoll, JobSummary};
use barrage_core::store::{JobStore, StoreError};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory `JobStore`
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<Uuid, Arc<Mutex<Job>>>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }

    fn find(&self, id: Uuid) -> Option<Arc<Mutex<Job>>> {
        self.jobs.read().get(&id).cloned()
    }

    fn find_or_err(&self, id: Uuid) -> Result<Arc<Mutex<Job>>, StoreError> {
        self.find(id).ok_or(StoreError::NotFound(id))
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, profile: LoadProfile) -> Result<Job, StoreError> {
        let mut jobs = self.jobs.write();

        let job = loop {
            let id = Uuid::new_v4();
            if !jobs.contains_key(&id) {
                break Job::new(id, profile);
            }
            tracing::warn!("Job id collision on {}, regenerating", id);
        };

        jobs.insert(job.id, Arc::new(Mutex::new(job.clone())));
        Ok(job)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        Ok(self.find(id).map(|job| job.lock().clone()))
    }

    async fn append_results(
        &self,
        id: Uuid,
        results: Vec<RequestResult>,
    ) -> Result<usize, StoreError> {
        let job = self.find_or_err(id)?;
        let mut job = job.lock();
        job.record_wave(results)
            .map_err(|source| StoreError::InvalidState { id, source })
    }

    async fn finish(
        &self,
        id: Uuid,
        status: JobStatus,
        error: Option<String>,
    ) -> Result<(), StoreError> {
        let job = self.find_or_err(id)?;
        let mut job = job.lock();
        job.finish(status, error)
            .map_err(|source| StoreError::InvalidState { id, source })
    }

    async fn poll(&self, id: Uuid) -> Result<Option<JobPoll>, StoreError> {
        Ok(self.find(id).map(|job| JobPoll::drain(&mut job.lock())))
    }

    async fn list(&self) -> Result<Vec<JobSummary>, StoreError> {
        let jobs: Vec<Arc<Mutex<Job>>> = self.jobs.read().values().cloned().collect();
        let mut summaries: Vec<JobSummary> = jobs
            .iter()
            .map(|job| JobSummary::from(&*job.lock()))
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    async fn evict_finished_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut jobs = self.jobs.write();
        let before = jobs.len();
        jobs.retain(|_, job| {
            let job = job.lock();
            !matches!(job.finished_at, Some(finished) if job.status.is_terminal() && finished < cutoff)
        });
        Ok(before - jobs.len())
    }
}
