//! Job DTOs for the control API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::job::{Job, JobStatus};
use crate::domain::profile::HttpMethod;
use crate::domain::result::RequestResult;

/// Response to a job submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobResponse {
    pub job_id: Uuid,
}

/// Incremental view of a job returned by a poll
///
/// `new_results` holds only results not delivered by an earlier poll.
/// `all_results` is a full snapshot and is only present once the job has
/// completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPoll {
    pub status: JobStatus,
    pub progress: usize,
    pub total: u32,
    pub new_results: Vec<RequestResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_results: Option<Vec<RequestResult>>,
}

impl JobPoll {
    /// Builds the poll view and advances the job's delivery cursor
    pub fn drain(job: &mut Job) -> Self {
        let new_results = job.take_unseen();
        let all_results = (job.status == JobStatus::Completed).then(|| job.results.clone());

        Self {
            status: job.status,
            progress: job.progress(),
            total: job.total(),
            new_results,
            error: job.error.clone(),
            all_results,
        }
    }
}

/// Response to a cancellation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelJobResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

/// Lightweight job summary for listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: Uuid,
    pub status: JobStatus,
    pub progress: usize,
    pub total: u32,
    pub target_url: String,
    pub method: HttpMethod,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            status: job.status,
            progress: job.progress(),
            total: job.total(),
            target_url: job.profile.target_url.clone(),
            method: job.profile.method,
            created_at: job.created_at,
            finished_at: job.finished_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::LoadProfile;

    fn ok(id: u32) -> RequestResult {
        RequestResult::completed(id, 0.0, 1.0, 200, Default::default())
    }

    #[test]
    fn test_running_poll_has_no_snapshot() {
        let mut job = Job::new(Uuid::new_v4(), LoadProfile::new("http://example.test", 2));
        job.record_wave(vec![ok(0)]).unwrap();

        let poll = JobPoll::drain(&mut job);
        assert_eq!(poll.status, JobStatus::Running);
        assert_eq!(poll.progress, 1);
        assert_eq!(poll.total, 2);
        assert_eq!(poll.new_results.len(), 1);
        assert!(poll.all_results.is_none());

        let json = serde_json::to_value(&poll).unwrap();
        assert_eq!(json["status"], "RUNNING");
        assert!(json.get("allResults").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_completed_poll_includes_snapshot_independent_of_cursor() {
        let mut job = Job::new(Uuid::new_v4(), LoadProfile::new("http://example.test", 2));
        job.record_wave(vec![ok(1), ok(0)]).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        JobPoll::drain(&mut job);

        let poll = JobPoll::drain(&mut job);
        assert!(poll.new_results.is_empty());
        let all = poll.all_results.unwrap();
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 0]);
    }

    #[test]
    fn test_failed_poll_carries_error_without_snapshot() {
        let mut job = Job::new(Uuid::new_v4(), LoadProfile::new("http://example.test", 2));
        job.finish(JobStatus::Failed, Some("store unavailable".to_string()))
            .unwrap();

        let poll = JobPoll::drain(&mut job);
        assert_eq!(poll.error.as_deref(), Some("store unavailable"));
        assert!(poll.all_results.is_none());
    }

    #[test]
    fn test_create_response_wire_name() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(CreateJobResponse { job_id: id }).unwrap();
        assert_eq!(json["jobId"], id.to_string());
    }
}
