//! Job API Handlers
//!
//! HTTP endpoints for submitting, polling, cancelling and listing load jobs.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use barrage_core::domain::profile::LoadProfile;
use barrage_core::dto::job::{CancelJobResponse, CreateJobResponse, JobPoll, JobSummary};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::service::job_service;
use crate::state::AppState;

/// Ids that do not parse can never name a job, so they are reported the
/// same way as unknown ones.
fn parse_job_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| {
        tracing::debug!("Rejecting malformed job id: {}", raw);
        ApiError::job_not_found()
    })
}

/// POST /api/jobs
/// Validate a load profile and start a job for it
pub async fn submit_job(
    State(state): State<AppState>,
    payload: Result<Json<LoadProfile>, JsonRejection>,
) -> ApiResult<Json<CreateJobResponse>> {
    let Json(profile) = payload?;

    let job_id = job_service::submit_job(&state, profile).await?;

    Ok(Json(CreateJobResponse { job_id }))
}

/// GET /api/jobs/{id}
/// Poll a job: status, progress and the results produced since the last poll
pub async fn poll_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobPoll>> {
    let id = parse_job_id(&id)?;
    let poll = job_service::poll_job(&state, id).await?;

    tracing::debug!(
        "Polled job {}: {} ({}/{}), {} new result(s)",
        id,
        poll.status,
        poll.progress,
        poll.total,
        poll.new_results.len()
    );

    Ok(Json(poll))
}

/// POST /api/jobs/{id}/cancel
/// Request cancellation of a running job
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CancelJobResponse>> {
    let id = parse_job_id(&id)?;
    let response = job_service::cancel_job(&state, id).await?;
    Ok(Json(response))
}

/// GET /api/jobs
/// List retained jobs, newest first
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<JobSummary>>> {
    let jobs = job_service::list_jobs(&state).await?;
    Ok(Json(jobs))
}
