//! Storage-facing ports for the lifecycle services.
//!
//! Implementations: `store::postgres::PgStore` (production) and
//! `store::memory::MemoryStore` (tests). Every mutating method is one
//! atomic unit of work on the implementation side.

use async_trait::async_trait;
use thiserror::Error;

use crate::lifecycle::status::{ApplicationStatus, JobStatus, UnknownStatus};
use crate::models::application::{ApplicationDetail, JobApplication};
use crate::models::ids::{ApplicationId, CandidateId, JobId, RecruiterId, UserId};
use crate::models::job::{JobPost, JobQuery};
use crate::models::stats::{PlatformCounts, RecruiterCounts};
use crate::models::user::{CandidateProfile, RecruiterProfile};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("duplicate record: {0}")]
    Conflict(String),

    #[error("stored row is invalid: {0}")]
    Corrupt(#[from] UnknownStatus),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return StoreError::Conflict(db.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn recruiter_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<RecruiterProfile>, StoreError>;

    async fn insert_job(&self, job: &JobPost) -> Result<JobPost, StoreError>;

    async fn job_by_id(&self, job_id: JobId) -> Result<Option<JobPost>, StoreError>;

    /// Writes the editable columns of `job` in one statement. `status` and
    /// `rejection_reason` are written only when `write_status` is set, so
    /// a field-only edit never overwrites a concurrent moderation
    /// decision. The owning recruiter is never written.
    async fn update_job(
        &self,
        job: &JobPost,
        write_status: bool,
    ) -> Result<Option<JobPost>, StoreError>;

    /// Status-only write used by moderation. `rejection_reason` replaces
    /// the stored reason (`None` clears it).
    async fn update_job_status(
        &self,
        job_id: JobId,
        status: JobStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<JobPost>, StoreError>;

    /// Removes the job's applications, its saved-job bookmarks and then the
    /// job itself, all or nothing. `false` when the job does not exist.
    async fn delete_job_cascade(&self, job_id: JobId) -> Result<bool, StoreError>;

    /// One page plus the total match count.
    async fn list_jobs(&self, query: &JobQuery) -> Result<(Vec<JobPost>, i64), StoreError>;

    async fn jobs_by_recruiter(&self, recruiter_id: RecruiterId)
        -> Result<Vec<JobPost>, StoreError>;

    async fn jobs_by_status(&self, status: JobStatus) -> Result<Vec<JobPost>, StoreError>;

    async fn recruiter_counts(
        &self,
        recruiter_id: RecruiterId,
    ) -> Result<RecruiterCounts, StoreError>;
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn candidate_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<CandidateProfile>, StoreError>;

    /// True when a non-withdrawn application exists for the pair.
    async fn has_live_application(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<bool, StoreError>;

    /// Fails with [`StoreError::Conflict`] when a live application for the
    /// same (candidate, job) already exists.
    async fn insert_application(
        &self,
        application: &JobApplication,
    ) -> Result<JobApplication, StoreError>;

    async fn application_by_id(
        &self,
        app_id: ApplicationId,
    ) -> Result<Option<JobApplication>, StoreError>;

    /// Compare-and-set: writes only while the stored status is still
    /// `expected`. `None` when the row is gone or its status moved on.
    /// `notes: None` keeps the stored notes.
    async fn update_application_status(
        &self,
        app_id: ApplicationId,
        expected: ApplicationStatus,
        status: ApplicationStatus,
        notes: Option<&str>,
    ) -> Result<Option<JobApplication>, StoreError>;

    async fn delete_application(&self, app_id: ApplicationId) -> Result<bool, StoreError>;

    async fn applications_by_candidate(
        &self,
        candidate_id: CandidateId,
    ) -> Result<Vec<JobApplication>, StoreError>;

    async fn applications_for_jobs(
        &self,
        job_ids: &[JobId],
    ) -> Result<Vec<JobApplication>, StoreError>;

    async fn application_details_for_jobs(
        &self,
        job_ids: &[JobId],
    ) -> Result<Vec<ApplicationDetail>, StoreError>;

    /// Idempotent.
    async fn insert_saved_job(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<(), StoreError>;

    async fn delete_saved_job(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<bool, StoreError>;

    async fn saved_jobs_for(&self, candidate_id: CandidateId) -> Result<Vec<JobPost>, StoreError>;
}

#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Jobs by status, users by role and the application total from a
    /// single consistent read.
    async fn platform_counts(&self) -> Result<PlatformCounts, StoreError>;
}
