//! Job Service
//!
//! Business logic for job submission, polling and cancellation.

use barrage_core::domain::job::JobStatus;
use barrage_core::domain::profile::{LoadProfile, ProfileError};
use barrage_core::dto::job::{CancelJobResponse, JobPoll, JobSummary};
use barrage_core::store::StoreError;
use barrage_runner::CancelToken;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::state::AppState;

/// Service error type
#[derive(Debug, Error)]
pub enum JobError {
    #[error("job {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    ValidationError(#[from] ProfileError),

    #[error("{0}")]
    InvalidState(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for JobError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => JobError::NotFound(id),
            other => JobError::Store(other),
        }
    }
}

/// Validates the profile, creates a running job and starts its scheduler
///
/// Returns as soon as the job exists; the run happens in the background.
pub async fn submit_job(state: &AppState, profile: LoadProfile) -> Result<Uuid, JobError> {
    profile.validate(&state.limits)?;

    let job = state.store.create(profile).await?;
    let id = job.id;

    tracing::info!(
        "Job {} submitted: {} iteration(s) against {}",
        id,
        job.profile.iterations,
        job.profile.target_url
    );

    let cancel = CancelToken::new();
    state.active.insert(id, cancel.clone());
    launch(state, id, Arc::new(job.profile), cancel);

    Ok(id)
}

/// Returns the results produced since the previous poll
pub async fn poll_job(state: &AppState, id: Uuid) -> Result<JobPoll, JobError> {
    state.store.poll(id).await?.ok_or(JobError::NotFound(id))
}

/// Requests cancellation of a running job
///
/// The returned status is read after the token fired. It is still
/// `Running` while the current wave settles; a job whose last wave was
/// already in flight ends `Completed` rather than `Cancelled`.
pub async fn cancel_job(state: &AppState, id: Uuid) -> Result<CancelJobResponse, JobError> {
    let job = state.store.get(id).await?.ok_or(JobError::NotFound(id))?;

    if job.status.is_terminal() {
        return Err(JobError::InvalidState(format!(
            "Job {} already finished with status {}",
            id, job.status
        )));
    }

    let Some(token) = state.active.get(id) else {
        return Err(JobError::InvalidState(format!(
            "Job {} has no active scheduler to cancel",
            id
        )));
    };

    token.cancel();
    tracing::info!("Job {} cancellation requested", id);

    let status = state
        .store
        .get(id)
        .await?
        .map_or(job.status, |job| job.status);

    Ok(CancelJobResponse { job_id: id, status })
}

/// Lists every retained job
pub async fn list_jobs(state: &AppState) -> Result<Vec<JobSummary>, JobError> {
    Ok(state.store.list().await?)
}

/// Spawns the scheduler for a job
///
/// The run is nested in its own task so that a panic inside the scheduler
/// still leaves the job `Failed` instead of `Running` forever.
fn launch(state: &AppState, id: Uuid, profile: Arc<LoadProfile>, cancel: CancelToken) {
    let scheduler = Arc::clone(&state.scheduler);
    let store = Arc::clone(&state.store);
    let active = Arc::clone(&state.active);

    tokio::spawn(async move {
        let run = tokio::spawn(async move { scheduler.run(id, profile, cancel).await });

        if let Err(e) = run.await {
            tracing::error!("Scheduler task for job {} aborted: {}", id, e);
            let cause = format!("scheduler task aborted: {}", e);
            if let Err(e) = store.finish(id, JobStatus::Failed, Some(cause)).await {
                tracing::error!("Failed to mark job {} as failed: {}", id, e);
            }
        }

        active.remove(id);
    });
}
