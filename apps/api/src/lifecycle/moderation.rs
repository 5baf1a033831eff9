//! Admin moderation: approve or reject jobs and read platform aggregates.
//! Approval and rejection are status-only writes and bypass ownership.

use serde::Serialize;
use tracing::info;

use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::ports::{JobRepository, StatsRepository};
use crate::lifecycle::status::{check_job_transition, JobStatus, Role};
use crate::models::ids::JobId;
use crate::models::job::JobPost;
use crate::models::stats::DashboardStats;

pub const DEFAULT_REJECTION_REASON: &str = "No reason provided";

/// A rejected job together with the reason recorded on it.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub job: JobPost,
    pub reason: String,
}

pub struct AdminModeration<'a, J: ?Sized, S: ?Sized> {
    jobs: &'a J,
    stats: &'a S,
}

impl<'a, J, S> AdminModeration<'a, J, S>
where
    J: JobRepository + ?Sized,
    S: StatsRepository + ?Sized,
{
    pub fn new(jobs: &'a J, stats: &'a S) -> Self {
        AdminModeration { jobs, stats }
    }

    /// Exact status match, newest first. The token is parsed
    /// case-insensitively.
    pub async fn list_jobs_by_status(&self, token: &str) -> Result<Vec<JobPost>, LifecycleError> {
        let status = JobStatus::parse(token)?;
        Ok(self.jobs.jobs_by_status(status).await?)
    }

    pub async fn list_pending_jobs(&self) -> Result<Vec<JobPost>, LifecycleError> {
        Ok(self.jobs.jobs_by_status(JobStatus::Pending).await?)
    }

    pub async fn approve_job(&self, job_id: JobId) -> Result<JobPost, LifecycleError> {
        self.moderate(job_id, JobStatus::Approved, None).await
    }

    pub async fn reject_job(
        &self,
        job_id: JobId,
        reason: Option<&str>,
    ) -> Result<Rejection, LifecycleError> {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REJECTION_REASON)
            .to_string();
        let job = self
            .moderate(job_id, JobStatus::Rejected, Some(&reason))
            .await?;
        Ok(Rejection { job, reason })
    }

    async fn moderate(
        &self,
        job_id: JobId,
        next: JobStatus,
        reason: Option<&str>,
    ) -> Result<JobPost, LifecycleError> {
        let current = self
            .jobs
            .job_by_id(job_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("job", job_id))?;
        check_job_transition(Role::Admin, current.status, next)?;

        let job = self
            .jobs
            .update_job_status(job_id, next, reason)
            .await?
            .ok_or_else(|| LifecycleError::not_found("job", job_id))?;
        info!("Job {job_id} moderated: {} -> {}", current.status, job.status);
        Ok(job)
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, LifecycleError> {
        let counts = self.stats.platform_counts().await?;
        Ok(counts.into())
    }
}
