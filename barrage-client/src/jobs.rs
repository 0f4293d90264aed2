//! Job control endpoints

use crate::BarrageClient;
use crate::error::Result;
use barrage_core::domain::profile::LoadProfile;
use barrage_core::dto::job::{CancelJobResponse, CreateJobResponse, JobPoll, JobSummary};
use uuid::Uuid;

impl BarrageClient {
    /// Submit a load profile and start a job
    ///
    /// # Returns
    /// The id of the new job; the run continues on the orchestrator.
    pub async fn submit_job(&self, profile: &LoadProfile) -> Result<Uuid> {
        let url = format!("{}/api/jobs", self.base_url);
        let response = self.client.post(&url).json(profile).send().await?;

        let created: CreateJobResponse = Self::handle_response(response).await?;
        Ok(created.job_id)
    }

    /// Poll a job
    ///
    /// Each call returns only the results produced since the previous poll of
    /// the same job, by any client.
    pub async fn poll_job(&self, job_id: Uuid) -> Result<JobPoll> {
        let url = format!("{}/api/jobs/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        Self::handle_response(response).await
    }

    /// Request cancellation of a running job
    pub async fn cancel_job(&self, job_id: Uuid) -> Result<CancelJobResponse> {
        let url = format!("{}/api/jobs/{}/cancel", self.base_url, job_id);
        let response = self.client.post(&url).send().await?;

        Self::handle_response(response).await
    }

    /// List retained jobs, newest first
    pub async fn list_jobs(&self) -> Result<Vec<JobSummary>> {
        let url = format!("{}/api/jobs", self.base_url);
        let response = self.client.get(&url).send().await?;

        Self::handle_response(response).await
    }
}
