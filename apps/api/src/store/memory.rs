//! In-memory implementation of the lifecycle ports for unit tests. It
//! enforces the same uniqueness rule as the partial index on
//! `job_applications` and deletes a job's dependents with the job.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::lifecycle::ports::{ApplicationRepository, JobRepository, StatsRepository, StoreError};
use crate::lifecycle::status::{ApplicationStatus, JobStatus, Role};
use crate::models::application::{ApplicationDetail, JobApplication};
use crate::models::ids::{ApplicationId, CandidateId, JobId, RecruiterId, UserId};
use crate::models::job::{JobPost, JobQuery};
use crate::models::stats::{PlatformCounts, RecruiterCounts};
use crate::models::user::{CandidateProfile, RecruiterProfile};

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    unavailable: AtomicBool,
}

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, (String, Role)>,
    recruiters: Vec<RecruiterProfile>,
    candidates: Vec<CandidateProfile>,
    skills: HashMap<CandidateId, Vec<String>>,
    jobs: BTreeMap<JobId, JobPost>,
    applications: BTreeMap<ApplicationId, JobApplication>,
    saved: BTreeSet<(CandidateId, JobId)>,
}

impl MemoryStore {
    pub fn add_recruiter(&self, user_id: UserId) -> RecruiterProfile {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner
            .users
            .insert(user_id, (format!("{user_id}@recruiter.test"), Role::Recruiter));
        let profile = RecruiterProfile {
            recruiter_id: RecruiterId::new(),
            user_id,
            company_id: None,
            full_name: "Riley Recruiter".to_string(),
        };
        inner.recruiters.push(profile.clone());
        profile
    }

    pub fn add_candidate(&self, user_id: UserId, skills: &[&str]) -> CandidateProfile {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner
            .users
            .insert(user_id, (format!("{user_id}@candidate.test"), Role::Candidate));
        let profile = CandidateProfile {
            candidate_id: CandidateId::new(),
            user_id,
            full_name: "Casey Candidate".to_string(),
        };
        inner.candidates.push(profile.clone());
        inner.skills.insert(
            profile.candidate_id,
            skills.iter().map(|s| s.to_string()).collect(),
        );
        profile
    }

    pub fn add_admin(&self, user_id: UserId) {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner
            .users
            .insert(user_id, (format!("{user_id}@admin.test"), Role::Admin));
    }

    /// Makes every port call fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn saved_count_for_job(&self, job_id: JobId) -> usize {
        let inner = self.inner.lock().expect("memory store poisoned");
        inner.saved.iter().filter(|(_, j)| *j == job_id).count()
    }

    pub fn application_count_for_job(&self, job_id: JobId) -> usize {
        let inner = self.inner.lock().expect("memory store poisoned");
        inner
            .applications
            .values()
            .filter(|a| a.job_id == job_id)
            .count()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.inner.lock().expect("memory store poisoned"))
    }
}

fn newest_first(jobs: &mut [JobPost]) {
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
        .unwrap_or(false)
}

#[async_trait]
impl JobRepository for MemoryStore {
    async fn recruiter_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<RecruiterProfile>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .recruiters
            .iter()
            .find(|r| r.user_id == user_id)
            .cloned())
    }

    async fn insert_job(&self, job: &JobPost) -> Result<JobPost, StoreError> {
        let mut inner = self.lock()?;
        if inner.jobs.contains_key(&job.job_id) {
            return Err(StoreError::Conflict(format!("job {}", job.job_id)));
        }
        inner.jobs.insert(job.job_id, job.clone());
        Ok(job.clone())
    }

    async fn job_by_id(&self, job_id: JobId) -> Result<Option<JobPost>, StoreError> {
        Ok(self.lock()?.jobs.get(&job_id).cloned())
    }

    async fn update_job(
        &self,
        job: &JobPost,
        write_status: bool,
    ) -> Result<Option<JobPost>, StoreError> {
        let mut inner = self.lock()?;
        let Some(stored) = inner.jobs.get_mut(&job.job_id) else {
            return Ok(None);
        };
        let (status, rejection_reason) = if write_status {
            (job.status, job.rejection_reason.clone())
        } else {
            (stored.status, stored.rejection_reason.clone())
        };
        *stored = JobPost {
            recruiter_id: stored.recruiter_id,
            created_at: stored.created_at,
            updated_at: Utc::now(),
            status,
            rejection_reason,
            ..job.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn update_job_status(
        &self,
        job_id: JobId,
        status: JobStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<JobPost>, StoreError> {
        let mut inner = self.lock()?;
        Ok(inner.jobs.get_mut(&job_id).map(|job| {
            job.status = status;
            job.rejection_reason = rejection_reason.map(str::to_string);
            job.updated_at = Utc::now();
            job.clone()
        }))
    }

    async fn delete_job_cascade(&self, job_id: JobId) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;
        if !inner.jobs.contains_key(&job_id) {
            return Ok(false);
        }
        inner.applications.retain(|_, a| a.job_id != job_id);
        inner.saved.retain(|(_, j)| *j != job_id);
        inner.jobs.remove(&job_id);
        Ok(true)
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<(Vec<JobPost>, i64), StoreError> {
        let inner = self.lock()?;
        let mut matches: Vec<JobPost> = inner
            .jobs
            .values()
            .filter(|job| query.statuses.contains(&job.status))
            .filter(|job| {
                query
                    .search
                    .as_deref()
                    .map_or(true, |s| {
                        contains_ignore_case(Some(&job.title), s)
                            || contains_ignore_case(job.description.as_deref(), s)
                    })
            })
            .filter(|job| {
                query
                    .location
                    .as_deref()
                    .map_or(true, |l| contains_ignore_case(job.location.as_deref(), l))
            })
            .cloned()
            .collect();
        newest_first(&mut matches);
        let total = matches.len() as i64;
        let page = matches
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn jobs_by_recruiter(
        &self,
        recruiter_id: RecruiterId,
    ) -> Result<Vec<JobPost>, StoreError> {
        let inner = self.lock()?;
        let mut jobs: Vec<JobPost> = inner
            .jobs
            .values()
            .filter(|job| job.recruiter_id == recruiter_id)
            .cloned()
            .collect();
        newest_first(&mut jobs);
        Ok(jobs)
    }

    async fn jobs_by_status(&self, status: JobStatus) -> Result<Vec<JobPost>, StoreError> {
        let inner = self.lock()?;
        let mut jobs: Vec<JobPost> = inner
            .jobs
            .values()
            .filter(|job| job.status == status)
            .cloned()
            .collect();
        newest_first(&mut jobs);
        Ok(jobs)
    }

    async fn recruiter_counts(
        &self,
        recruiter_id: RecruiterId,
    ) -> Result<RecruiterCounts, StoreError> {
        let inner = self.lock()?;
        let mut counts = RecruiterCounts::default();
        for job in inner.jobs.values().filter(|j| j.recruiter_id == recruiter_id) {
            *counts.jobs_by_status.entry(job.status).or_insert(0) += 1;
        }
        for application in inner.applications.values() {
            let owned = inner
                .jobs
                .get(&application.job_id)
                .map_or(false, |j| j.recruiter_id == recruiter_id);
            if owned {
                counts.applications += 1;
                if application.status == ApplicationStatus::Pending {
                    counts.pending_applications += 1;
                }
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl ApplicationRepository for MemoryStore {
    async fn candidate_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<CandidateProfile>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .candidates
            .iter()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn has_live_application(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<bool, StoreError> {
        let inner = self.lock()?;
        Ok(inner.applications.values().any(|a| {
            a.candidate_id == candidate_id
                && a.job_id == job_id
                && a.status != ApplicationStatus::Withdrawn
        }))
    }

    async fn insert_application(
        &self,
        application: &JobApplication,
    ) -> Result<JobApplication, StoreError> {
        let mut inner = self.lock()?;
        if !inner.jobs.contains_key(&application.job_id) {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }
        let duplicate = inner.applications.values().any(|a| {
            a.candidate_id == application.candidate_id
                && a.job_id == application.job_id
                && a.status != ApplicationStatus::Withdrawn
        });
        if duplicate {
            return Err(StoreError::Conflict(
                "job_applications_live_unique".to_string(),
            ));
        }
        inner
            .applications
            .insert(application.app_id, application.clone());
        Ok(application.clone())
    }

    async fn application_by_id(
        &self,
        app_id: ApplicationId,
    ) -> Result<Option<JobApplication>, StoreError> {
        Ok(self.lock()?.applications.get(&app_id).cloned())
    }

    async fn update_application_status(
        &self,
        app_id: ApplicationId,
        expected: ApplicationStatus,
        status: ApplicationStatus,
        notes: Option<&str>,
    ) -> Result<Option<JobApplication>, StoreError> {
        let mut inner = self.lock()?;
        let current = inner
            .applications
            .get_mut(&app_id)
            .filter(|app| app.status == expected);
        Ok(current.map(|app| {
            app.status = status;
            if let Some(notes) = notes {
                app.recruiter_notes = Some(notes.to_string());
            }
            app.updated_at = Utc::now();
            app.clone()
        }))
    }

    async fn delete_application(&self, app_id: ApplicationId) -> Result<bool, StoreError> {
        Ok(self.lock()?.applications.remove(&app_id).is_some())
    }

    async fn applications_by_candidate(
        &self,
        candidate_id: CandidateId,
    ) -> Result<Vec<JobApplication>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .applications
            .values()
            .filter(|a| a.candidate_id == candidate_id)
            .cloned()
            .collect())
    }

    async fn applications_for_jobs(
        &self,
        job_ids: &[JobId],
    ) -> Result<Vec<JobApplication>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .applications
            .values()
            .filter(|a| job_ids.contains(&a.job_id))
            .cloned()
            .collect())
    }

    async fn application_details_for_jobs(
        &self,
        job_ids: &[JobId],
    ) -> Result<Vec<ApplicationDetail>, StoreError> {
        let inner = self.lock()?;
        let details = inner
            .applications
            .values()
            .filter(|a| job_ids.contains(&a.job_id))
            .filter_map(|a| {
                let candidate = inner
                    .candidates
                    .iter()
                    .find(|c| c.candidate_id == a.candidate_id)?;
                let job = inner.jobs.get(&a.job_id)?;
                let email = inner
                    .users
                    .get(&candidate.user_id)
                    .map(|(email, _)| email.clone())
                    .unwrap_or_default();
                Some(ApplicationDetail {
                    application_id: a.app_id,
                    job_id: a.job_id,
                    candidate_id: a.candidate_id,
                    job_title: job.title.clone(),
                    candidate_name: candidate.full_name.clone(),
                    candidate_email: email,
                    candidate_phone: None,
                    candidate_location: None,
                    candidate_experience: None,
                    candidate_education: None,
                    candidate_summary: None,
                    candidate_skills: inner
                        .skills
                        .get(&a.candidate_id)
                        .cloned()
                        .unwrap_or_default(),
                    resume_url: a
                        .resume_id
                        .map(|id| format!("/api/v1/resumes/{id}/download")),
                    cover_letter: a.cover_letter.clone().unwrap_or_default(),
                    status: a.status,
                    notes: a.recruiter_notes.clone(),
                    applied_at: a.applied_at,
                })
            })
            .collect();
        Ok(details)
    }

    async fn insert_saved_job(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if !inner.jobs.contains_key(&job_id) {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }
        inner.saved.insert((candidate_id, job_id));
        Ok(())
    }

    async fn delete_saved_job(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<bool, StoreError> {
        Ok(self.lock()?.saved.remove(&(candidate_id, job_id)))
    }

    async fn saved_jobs_for(&self, candidate_id: CandidateId) -> Result<Vec<JobPost>, StoreError> {
        let inner = self.lock()?;
        let mut jobs: Vec<JobPost> = inner
            .saved
            .iter()
            .filter(|(c, _)| *c == candidate_id)
            .filter_map(|(_, job_id)| inner.jobs.get(job_id).cloned())
            .collect();
        newest_first(&mut jobs);
        Ok(jobs)
    }
}

#[async_trait]
impl StatsRepository for MemoryStore {
    async fn platform_counts(&self) -> Result<PlatformCounts, StoreError> {
        let inner = self.lock()?;
        let mut counts = PlatformCounts::default();
        for job in inner.jobs.values() {
            *counts.jobs_by_status.entry(job.status).or_insert(0) += 1;
        }
        for (_, role) in inner.users.values() {
            *counts
                .users_by_role
                .entry(role.as_str().to_string())
                .or_insert(0) += 1;
        }
        counts.applications = inner.applications.len() as i64;
        Ok(counts)
    }
}
