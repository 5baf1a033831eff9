//! Recruiter-side job lifecycle: create, edit, submit for review, delete,
//! plus the public listing.

use chrono::Utc;
use tracing::{info, warn};

use crate::config::LifecyclePolicy;
use crate::lifecycle::error::{Deletion, LifecycleError};
use crate::lifecycle::ports::JobRepository;
use crate::lifecycle::status::{check_job_transition, JobStatus, Role, UnknownStatus};
use crate::models::ids::{JobId, UserId};
use crate::models::job::{JobFilters, JobPage, JobPost, JobQuery, JobUpdate, NewJobFields};
use crate::models::stats::RecruiterDashboard;
use crate::models::user::RecruiterProfile;

pub struct JobLifecycle<'a, J: ?Sized> {
    jobs: &'a J,
    policy: &'a LifecyclePolicy,
}

impl<'a, J> JobLifecycle<'a, J>
where
    J: JobRepository + ?Sized,
{
    pub fn new(jobs: &'a J, policy: &'a LifecyclePolicy) -> Self {
        JobLifecycle { jobs, policy }
    }

    async fn recruiter(&self, user_id: UserId) -> Result<RecruiterProfile, LifecycleError> {
        self.jobs
            .recruiter_by_user(user_id)
            .await?
            .ok_or(LifecycleError::NotARecruiter)
    }

    /// Loads a job and confirms `user_id` owns it. A caller without a
    /// recruiter profile is refused the same way as a foreign recruiter.
    async fn owned_job(&self, job_id: JobId, user_id: UserId) -> Result<JobPost, LifecycleError> {
        let job = self
            .jobs
            .job_by_id(job_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("job", job_id))?;
        match self.jobs.recruiter_by_user(user_id).await? {
            Some(recruiter) if recruiter.recruiter_id == job.recruiter_id => Ok(job),
            _ => {
                warn!("User {user_id} attempted to modify job {job_id} they do not own");
                Err(LifecycleError::Forbidden(format!(
                    "job {job_id} belongs to another recruiter"
                )))
            }
        }
    }

    /// New jobs always start as `DRAFT`, owned by the caller's recruiter
    /// profile.
    pub async fn create_job(
        &self,
        user_id: UserId,
        fields: NewJobFields,
    ) -> Result<JobPost, LifecycleError> {
        let recruiter = self.recruiter(user_id).await?;
        let now = Utc::now();
        let job = JobPost {
            job_id: JobId::new(),
            recruiter_id: recruiter.recruiter_id,
            company_id: recruiter.company_id,
            title: fields.title.trim().to_string(),
            description: fields.description,
            salary_min: fields.salary_min,
            salary_max: fields.salary_max,
            location: fields.location,
            job_type: fields.job_type,
            application_deadline: fields.application_deadline,
            status: JobStatus::Draft,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        validate_job(&job)?;

        let stored = self.jobs.insert_job(&job).await?;
        info!(
            "Created job {} for recruiter {}",
            stored.job_id, stored.recruiter_id
        );
        Ok(stored)
    }

    pub async fn update_job(
        &self,
        job_id: JobId,
        user_id: UserId,
        update: JobUpdate,
    ) -> Result<JobPost, LifecycleError> {
        let mut job = self.owned_job(job_id, user_id).await?;
        let requested = match update.status.as_deref() {
            Some(token) => self.requested_status(job_id, token)?,
            None => None,
        };

        apply_fields(&mut job, update);
        if let Some(next) = requested {
            move_to(&mut job, next)?;
        }
        validate_job(&job)?;

        let stored = self
            .jobs
            .update_job(&job, requested.is_some())
            .await?
            .ok_or_else(|| LifecycleError::not_found("job", job_id))?;
        info!("Updated job {job_id} (status {})", stored.status);
        Ok(stored)
    }

    fn requested_status(
        &self,
        job_id: JobId,
        token: &str,
    ) -> Result<Option<JobStatus>, UnknownStatus> {
        match JobStatus::parse(token) {
            Ok(status) => Ok(Some(status)),
            Err(err) if self.policy.strict_job_status => Err(err),
            Err(err) => {
                warn!("Ignoring status change on job {job_id}: {err}");
                Ok(None)
            }
        }
    }

    /// Moves a job into the moderation queue.
    pub async fn submit_for_review(
        &self,
        job_id: JobId,
        user_id: UserId,
    ) -> Result<JobPost, LifecycleError> {
        let mut job = self.owned_job(job_id, user_id).await?;
        move_to(&mut job, JobStatus::Pending)?;
        validate_job(&job)?;

        let stored = self
            .jobs
            .update_job(&job, true)
            .await?
            .ok_or_else(|| LifecycleError::not_found("job", job_id))?;
        info!("Job {job_id} submitted for review");
        Ok(stored)
    }

    /// Deletes the job together with its applications and bookmarks.
    pub async fn delete_job(
        &self,
        job_id: JobId,
        user_id: UserId,
    ) -> Result<Deletion, LifecycleError> {
        let Some(job) = self.jobs.job_by_id(job_id).await? else {
            return Ok(Deletion::Missing(format!("job {job_id} not found")));
        };
        let owner = self.jobs.recruiter_by_user(user_id).await?;
        if owner.map(|r| r.recruiter_id) != Some(job.recruiter_id) {
            warn!("User {user_id} attempted to delete job {job_id} they do not own");
            return Ok(Deletion::Refused(format!(
                "job {job_id} belongs to another recruiter"
            )));
        }

        if !self.jobs.delete_job_cascade(job_id).await? {
            return Ok(Deletion::Missing(format!("job {job_id} not found")));
        }
        info!("Deleted job {job_id} with its applications and saved entries");
        Ok(Deletion::Deleted)
    }

    pub async fn get_job(&self, job_id: JobId) -> Result<JobPost, LifecycleError> {
        self.jobs
            .job_by_id(job_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("job", job_id))
    }

    /// Paginated listing, newest first. Without a status filter only
    /// candidate-visible jobs are returned.
    pub async fn list_jobs(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
        filters: JobFilters,
    ) -> Result<JobPage, LifecycleError> {
        let statuses = resolve_status_filter(filters.status.as_deref())?;
        let page = page.unwrap_or(1).max(1);
        let page_size = page_size
            .unwrap_or(self.policy.default_page_size)
            .clamp(1, self.policy.max_page_size.max(1));

        let query = JobQuery {
            search: non_blank(filters.search),
            location: non_blank(filters.location),
            statuses,
            offset: i64::from(page - 1) * i64::from(page_size),
            limit: i64::from(page_size),
        };
        let (jobs, total) = self.jobs.list_jobs(&query).await?;
        Ok(JobPage {
            jobs,
            total,
            page,
            page_size,
        })
    }

    pub async fn list_recruiter_jobs(&self, user_id: UserId) -> Result<Vec<JobPost>, LifecycleError> {
        let recruiter = self.recruiter(user_id).await?;
        Ok(self.jobs.jobs_by_recruiter(recruiter.recruiter_id).await?)
    }

    pub async fn recruiter_dashboard(
        &self,
        user_id: UserId,
    ) -> Result<RecruiterDashboard, LifecycleError> {
        let recruiter = self.recruiter(user_id).await?;
        let counts = self.jobs.recruiter_counts(recruiter.recruiter_id).await?;
        Ok(counts.into())
    }
}

/// `APPROVED` and `OPEN` both mean "the visible class"; any other valid
/// token is an exact match.
pub fn resolve_status_filter(token: Option<&str>) -> Result<Vec<JobStatus>, UnknownStatus> {
    let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
        return Ok(JobStatus::VISIBLE.to_vec());
    };
    let status = JobStatus::parse(token)?;
    if status.is_visible() {
        Ok(JobStatus::VISIBLE.to_vec())
    } else {
        Ok(vec![status])
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn apply_fields(job: &mut JobPost, update: JobUpdate) {
    if let Some(title) = update.title {
        job.title = title.trim().to_string();
    }
    if update.description.is_some() {
        job.description = update.description;
    }
    if update.salary_min.is_some() {
        job.salary_min = update.salary_min;
    }
    if update.salary_max.is_some() {
        job.salary_max = update.salary_max;
    }
    if update.location.is_some() {
        job.location = update.location;
    }
    if update.job_type.is_some() {
        job.job_type = update.job_type;
    }
    if update.application_deadline.is_some() {
        job.application_deadline = update.application_deadline;
    }
}

fn move_to(job: &mut JobPost, next: JobStatus) -> Result<(), LifecycleError> {
    check_job_transition(Role::Recruiter, job.status, next)?;
    if job.status == JobStatus::Rejected && next != JobStatus::Rejected {
        job.rejection_reason = None;
    }
    job.status = next;
    Ok(())
}

/// Salaries are stored as NUMERIC(15,2).
const MAX_SALARY: f64 = 1e13;

fn validate_job(job: &JobPost) -> Result<(), LifecycleError> {
    if job.title.is_empty() {
        return Err(LifecycleError::Validation("title must not be empty".into()));
    }
    for (name, value) in [("salary_min", job.salary_min), ("salary_max", job.salary_max)] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(LifecycleError::Validation(format!(
                    "{name} must be a non-negative number"
                )));
            }
            if v >= MAX_SALARY {
                return Err(LifecycleError::Validation(format!(
                    "{name} must be below {MAX_SALARY:e}"
                )));
            }
        }
    }
    if let (Some(min), Some(max)) = (job.salary_min, job.salary_max) {
        if min > max {
            return Err(LifecycleError::Validation(
                "salary_min must not exceed salary_max".into(),
            ));
        }
    }
    Ok(())
}
