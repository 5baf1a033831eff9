//! Candidate applications and saved-job bookmarks.
//!
//! Recruiters act on applications through the jobs they own: every
//! recruiter-side operation first loads the recruiter's job ids and then
//! checks the application's `job_id` against them.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{info, warn};

use crate::lifecycle::error::{Deletion, DeletionReport, LifecycleError};
use crate::lifecycle::ports::{ApplicationRepository, JobRepository, StoreError};
use crate::lifecycle::status::{
    check_application_transition, ApplicationStatus, Role, TransitionDenied,
};
use crate::models::application::{
    ApplicationDetail, ApplicationRequest, ApplicationStatusChange, JobApplication,
};
use crate::models::ids::{ApplicationId, JobId, UserId};
use crate::models::job::JobPost;
use crate::models::user::CandidateProfile;

pub struct ApplicationLifecycle<'a, J: ?Sized, A: ?Sized> {
    jobs: &'a J,
    applications: &'a A,
}

impl<'a, J, A> ApplicationLifecycle<'a, J, A>
where
    J: JobRepository + ?Sized,
    A: ApplicationRepository + ?Sized,
{
    pub fn new(jobs: &'a J, applications: &'a A) -> Self {
        ApplicationLifecycle { jobs, applications }
    }

    async fn candidate(&self, user_id: UserId) -> Result<Option<CandidateProfile>, StoreError> {
        self.applications.candidate_by_user(user_id).await
    }

    /// Job ids owned by the recruiter behind `user_id`.
    async fn recruiter_job_ids(&self, user_id: UserId) -> Result<Vec<JobId>, LifecycleError> {
        let recruiter = self
            .jobs
            .recruiter_by_user(user_id)
            .await?
            .ok_or(LifecycleError::NotARecruiter)?;
        let jobs = self.jobs.jobs_by_recruiter(recruiter.recruiter_id).await?;
        Ok(jobs.into_iter().map(|job| job.job_id).collect())
    }

    /// Loads an application and confirms it belongs to one of the
    /// recruiter's jobs.
    async fn owned_application(
        &self,
        app_id: ApplicationId,
        user_id: UserId,
    ) -> Result<JobApplication, LifecycleError> {
        let job_ids = self.recruiter_job_ids(user_id).await?;
        if job_ids.is_empty() {
            return Err(LifecycleError::not_found("jobs for recruiter", user_id));
        }
        let application = self
            .applications
            .application_by_id(app_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("application", app_id))?;
        if !job_ids.contains(&application.job_id) {
            warn!("User {user_id} attempted to act on application {app_id} for a job they do not own");
            return Err(LifecycleError::Forbidden(format!(
                "application {app_id} is for a job owned by another recruiter"
            )));
        }
        Ok(application)
    }

    /// Writes `next` only if the stored status is still the one the
    /// transition was checked against. A concurrent change in between is
    /// reported against the status that won.
    async fn persist_status(
        &self,
        checked: &JobApplication,
        role: Role,
        next: ApplicationStatus,
        notes: Option<&str>,
    ) -> Result<JobApplication, LifecycleError> {
        let app_id = checked.app_id;
        if let Some(stored) = self
            .applications
            .update_application_status(app_id, checked.status, next, notes)
            .await?
        {
            return Ok(stored);
        }

        let latest = self
            .applications
            .application_by_id(app_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("application", app_id))?;
        warn!(
            "Application {app_id} changed from {} to {} before the {role} write to {next}",
            checked.status, latest.status
        );
        Err(TransitionDenied {
            entity: "application",
            role,
            from: latest.status.as_str(),
            to: next.as_str(),
        }
        .into())
    }

    /// Whether the caller already holds a live (non-withdrawn) application
    /// for the job. Callers without a candidate profile have none.
    pub async fn check_existing_application(
        &self,
        job_id: JobId,
        user_id: UserId,
    ) -> Result<bool, LifecycleError> {
        let Some(candidate) = self.candidate(user_id).await? else {
            return Ok(false);
        };
        Ok(self
            .applications
            .has_live_application(candidate.candidate_id, job_id)
            .await?)
    }

    pub async fn apply_for_job(
        &self,
        job_id: JobId,
        user_id: UserId,
        request: ApplicationRequest,
    ) -> Result<JobApplication, LifecycleError> {
        let candidate = self
            .candidate(user_id)
            .await?
            .ok_or(LifecycleError::NoProfile)?;
        if self.jobs.job_by_id(job_id).await?.is_none() {
            return Err(LifecycleError::not_found("job", job_id));
        }

        let now = Utc::now();
        let application = JobApplication {
            app_id: ApplicationId::new(),
            job_id,
            candidate_id: candidate.candidate_id,
            resume_id: request.resume_id,
            cover_letter: request.cover_letter,
            status: ApplicationStatus::Pending,
            recruiter_notes: None,
            applied_at: now,
            updated_at: now,
        };
        let stored = match self.applications.insert_application(&application).await {
            Ok(stored) => stored,
            Err(StoreError::Conflict(_)) => return Err(LifecycleError::AlreadyApplied),
            Err(err) => return Err(err.into()),
        };
        info!(
            "Candidate {} applied for job {job_id} (application {})",
            candidate.candidate_id, stored.app_id
        );
        Ok(stored)
    }

    /// The check-then-apply flow the HTTP layer exposes. The storage
    /// uniqueness guard still catches a concurrent duplicate.
    pub async fn submit_application(
        &self,
        job_id: JobId,
        user_id: UserId,
        request: ApplicationRequest,
    ) -> Result<JobApplication, LifecycleError> {
        if self.check_existing_application(job_id, user_id).await? {
            return Err(LifecycleError::AlreadyApplied);
        }
        self.apply_for_job(job_id, user_id, request).await
    }

    pub async fn update_application_status(
        &self,
        app_id: ApplicationId,
        user_id: UserId,
        change: ApplicationStatusChange,
    ) -> Result<JobApplication, LifecycleError> {
        let application = self.owned_application(app_id, user_id).await?;
        let next = ApplicationStatus::parse(&change.status)?;
        if let Err(denied) = check_application_transition(Role::Recruiter, application.status, next)
        {
            warn!("Refused status change on application {app_id}: {denied}");
            return Err(denied.into());
        }

        let stored = self
            .persist_status(&application, Role::Recruiter, next, change.notes.as_deref())
            .await?;
        info!(
            "Application {app_id} moved from {} to {}",
            application.status, stored.status
        );
        Ok(stored)
    }

    /// Never fails on "nothing to delete": missing applications and
    /// foreign ones are reported in the returned status code.
    pub async fn delete_application(
        &self,
        app_id: ApplicationId,
        user_id: UserId,
    ) -> Result<DeletionReport, LifecycleError> {
        let deletion = match self.owned_application(app_id, user_id).await {
            Ok(_) => {
                if self.applications.delete_application(app_id).await? {
                    info!("Deleted application {app_id}");
                    Deletion::Deleted
                } else {
                    Deletion::Missing(format!("application {app_id} not found"))
                }
            }
            Err(LifecycleError::NotFound { entity, id }) => {
                Deletion::Missing(format!("{entity} {id} not found"))
            }
            Err(LifecycleError::NotARecruiter) => {
                Deletion::Refused("caller has no recruiter profile".to_string())
            }
            Err(LifecycleError::Forbidden(reason)) => Deletion::Refused(reason),
            Err(err) => return Err(err),
        };
        Ok(deletion.into())
    }

    pub async fn withdraw_application(
        &self,
        app_id: ApplicationId,
        user_id: UserId,
    ) -> Result<JobApplication, LifecycleError> {
        let candidate = self
            .candidate(user_id)
            .await?
            .ok_or(LifecycleError::NoProfile)?;
        let application = self
            .applications
            .application_by_id(app_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("application", app_id))?;
        if application.candidate_id != candidate.candidate_id {
            warn!("User {user_id} attempted to withdraw application {app_id} they do not own");
            return Err(LifecycleError::Forbidden(format!(
                "application {app_id} belongs to another candidate"
            )));
        }
        check_application_transition(
            Role::Candidate,
            application.status,
            ApplicationStatus::Withdrawn,
        )?;

        let stored = self
            .persist_status(&application, Role::Candidate, ApplicationStatus::Withdrawn, None)
            .await?;
        info!("Application {app_id} withdrawn by candidate {}", candidate.candidate_id);
        Ok(stored)
    }

    pub async fn get_user_applications(
        &self,
        user_id: UserId,
    ) -> Result<Vec<JobApplication>, LifecycleError> {
        let Some(candidate) = self.candidate(user_id).await? else {
            return Ok(Vec::new());
        };
        Ok(self
            .applications
            .applications_by_candidate(candidate.candidate_id)
            .await?)
    }

    pub async fn get_recruiter_applications(
        &self,
        user_id: UserId,
    ) -> Result<Vec<JobApplication>, LifecycleError> {
        let job_ids = self.recruiter_job_ids(user_id).await?;
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.applications.applications_for_jobs(&job_ids).await?)
    }

    /// Applications joined with candidate profile, email and skills.
    pub async fn get_recruiter_applications_with_details(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ApplicationDetail>, LifecycleError> {
        let job_ids = self.recruiter_job_ids(user_id).await?;
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .applications
            .application_details_for_jobs(&job_ids)
            .await?)
    }

    /// Idempotent. `false` when the caller has no candidate profile.
    pub async fn save_job(&self, job_id: JobId, user_id: UserId) -> Result<bool, LifecycleError> {
        let Some(candidate) = self.candidate(user_id).await? else {
            return Ok(false);
        };
        if self.jobs.job_by_id(job_id).await?.is_none() {
            return Err(LifecycleError::not_found("job", job_id));
        }
        self.applications
            .insert_saved_job(candidate.candidate_id, job_id)
            .await?;
        Ok(true)
    }

    /// `false` when there was nothing to remove.
    pub async fn unsave_job(&self, job_id: JobId, user_id: UserId) -> Result<bool, LifecycleError> {
        let Some(candidate) = self.candidate(user_id).await? else {
            return Ok(false);
        };
        Ok(self
            .applications
            .delete_saved_job(candidate.candidate_id, job_id)
            .await?)
    }

    pub async fn get_saved_jobs(&self, user_id: UserId) -> Result<Vec<JobPost>, LifecycleError> {
        let Some(candidate) = self.candidate(user_id).await? else {
            return Ok(Vec::new());
        };
        let jobs = self
            .applications
            .saved_jobs_for(candidate.candidate_id)
            .await?;
        let mut seen = HashSet::new();
        Ok(jobs.into_iter().filter(|j| seen.insert(j.job_id)).collect())
    }
}
