//! Batch scheduler
//!
//! Drives one job from `Running` to a terminal status. Iterations are
//! issued in contiguous waves of at most `concurrency` requests; every
//! request in a wave runs in its own task and the next wave only starts
//! once the whole wave has settled.

use barrage_core::domain::job::JobStatus;
use barrage_core::domain::profile::LoadProfile;
use barrage_core::domain::result::RequestResult;
use barrage_core::store::{JobStore, StoreError};
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::config::RunnerConfig;
use crate::service::RequestExecutor;

/// Job-level failure of the scheduling logic itself
///
/// Request failures never show up here; they are captured in results.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("job store error: {0}")]
    Store(#[from] StoreError),

    #[error("request task for iteration batch {batch:?} aborted: {reason}")]
    RequestTask { batch: Range<u32>, reason: String },
}

/// How a scheduler run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub status: JobStatus,
    /// Waves whose results were recorded
    pub waves: usize,
}

/// Splits `[0, iterations)` into contiguous waves of `concurrency` ids
///
/// The last wave holds the remainder. A zero concurrency is treated as 1.
pub fn plan_waves(iterations: u32, concurrency: u32) -> impl Iterator<Item = Range<u32>> {
    let size = concurrency.max(1);
    (0..iterations)
        .step_by(size as usize)
        .map(move |start| start..start.saturating_add(size).min(iterations))
}

/// Turns a load profile into bounded-concurrency waves of requests
pub struct BatchScheduler {
    executor: Arc<dyn RequestExecutor>,
    store: Arc<dyn JobStore>,
    wave_pause: Duration,
}

impl BatchScheduler {
    pub fn new(
        executor: Arc<dyn RequestExecutor>,
        store: Arc<dyn JobStore>,
        config: &RunnerConfig,
    ) -> Self {
        Self {
            executor,
            store,
            wave_pause: config.wave_pause,
        }
    }

    /// Runs the job to a terminal status and records it in the store
    pub async fn run(
        &self,
        job_id: Uuid,
        profile: Arc<LoadProfile>,
        cancel: CancelToken,
    ) -> RunOutcome {
        info!(
            "Job {} started: {} x {} {} (concurrency {})",
            job_id, profile.iterations, profile.method, profile.target_url, profile.concurrency
        );

        let mut waves = 0;
        let status = match self.drive(job_id, &profile, &cancel, &mut waves).await {
            Ok(status) => status,
            Err(e) => {
                error!("Job {} failed after {} wave(s): {}", job_id, waves, e);
                if let Err(e) = self
                    .store
                    .finish(job_id, JobStatus::Failed, Some(e.to_string()))
                    .await
                {
                    error!("Failed to record final status of job {}: {}", job_id, e);
                }
                JobStatus::Failed
            }
        };

        info!("Job {} finished: {} after {} wave(s)", job_id, status, waves);

        RunOutcome { status, waves }
    }

    /// Issues the waves in order
    ///
    /// On `Ok` the job is already terminal in the store: the final wave
    /// completes it as it is appended, and cancellation is recorded here.
    /// Cancellation only stops waves that have not started; a wave in flight
    /// is settled and appended.
    async fn drive(
        &self,
        job_id: Uuid,
        profile: &Arc<LoadProfile>,
        cancel: &CancelToken,
        waves: &mut usize,
    ) -> Result<JobStatus, SchedulerError> {
        for (index, batch) in plan_waves(profile.iterations, profile.concurrency).enumerate() {
            if index > 0 && !self.wave_pause.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(self.wave_pause) => {}
                }
            }

            if cancel.is_cancelled() {
                warn!("Job {} cancelled before wave {}", job_id, index + 1);
                self.store.finish(job_id, JobStatus::Cancelled, None).await?;
                return Ok(JobStatus::Cancelled);
            }

            let results = self.run_wave(batch.clone(), profile, cancel).await?;
            let progress = self.store.append_results(job_id, results).await?;
            *waves += 1;

            debug!(
                "Job {} wave {} ({:?}) settled, progress {}/{}",
                job_id,
                index + 1,
                batch,
                progress,
                profile.iterations
            );
        }

        if profile.iterations == 0 {
            self.store.finish(job_id, JobStatus::Completed, None).await?;
        }

        Ok(JobStatus::Completed)
    }

    /// Issues every iteration of `batch` concurrently and waits for all of them
    ///
    /// Results come back in settlement order.
    async fn run_wave(
        &self,
        batch: Range<u32>,
        profile: &Arc<LoadProfile>,
        cancel: &CancelToken,
    ) -> Result<Vec<RequestResult>, SchedulerError> {
        let mut tasks = JoinSet::new();

        for iteration in batch.clone() {
            let executor = Arc::clone(&self.executor);
            let profile = Arc::clone(profile);
            let cancel = cancel.clone();

            tasks.spawn(async move { executor.execute(iteration, &profile, &cancel).await });
        }

        let mut results = Vec::with_capacity(batch.len());
        while let Some(joined) = tasks.join_next().await {
            // Dropping `tasks` on error aborts the rest of the wave.
            let result = joined.map_err(|e| SchedulerError::RequestTask {
                batch: batch.clone(),
                reason: e.to_string(),
            })?;
            results.push(result);
        }

        Ok(results)
    }
}
