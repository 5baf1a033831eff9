use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::lifecycle::status::{ApplicationStatus, UnknownStatus};
use crate::models::ids::{ApplicationId, CandidateId, JobId, ResumeId};

pub const APPLICATION_COLUMNS: &str = "app_id, job_id, candidate_id, resume_id, cover_letter, \
     status, recruiter_notes, applied_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct JobApplicationRow {
    pub app_id: ApplicationId,
    pub job_id: JobId,
    pub candidate_id: CandidateId,
    pub resume_id: Option<ResumeId>,
    pub cover_letter: Option<String>,
    pub status: String,
    pub recruiter_notes: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub app_id: ApplicationId,
    pub job_id: JobId,
    pub candidate_id: CandidateId,
    pub resume_id: Option<ResumeId>,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub recruiter_notes: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobApplicationRow> for JobApplication {
    type Error = UnknownStatus;

    fn try_from(row: JobApplicationRow) -> Result<Self, Self::Error> {
        Ok(JobApplication {
            status: ApplicationStatus::parse(&row.status)?,
            app_id: row.app_id,
            job_id: row.job_id,
            candidate_id: row.candidate_id,
            resume_id: row.resume_id,
            cover_letter: row.cover_letter,
            recruiter_notes: row.recruiter_notes,
            applied_at: row.applied_at,
            updated_at: row.updated_at,
        })
    }
}

/// Recruiter-facing view of an application joined with the candidate's
/// profile, account email and skills.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationDetailRow {
    pub app_id: ApplicationId,
    pub job_id: JobId,
    pub candidate_id: CandidateId,
    pub job_title: String,
    pub candidate_name: String,
    pub candidate_email: String,
    pub candidate_phone: Option<String>,
    pub candidate_location: Option<String>,
    pub candidate_experience: Option<i32>,
    pub candidate_education: Option<String>,
    pub candidate_summary: Option<String>,
    pub candidate_skills: Vec<String>,
    pub resume_id: Option<ResumeId>,
    pub cover_letter: Option<String>,
    pub status: String,
    pub recruiter_notes: Option<String>,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationDetail {
    pub application_id: ApplicationId,
    pub job_id: JobId,
    pub candidate_id: CandidateId,
    pub job_title: String,
    pub candidate_name: String,
    pub candidate_email: String,
    pub candidate_phone: Option<String>,
    pub candidate_location: Option<String>,
    pub candidate_experience: Option<i32>,
    pub candidate_education: Option<String>,
    pub candidate_summary: Option<String>,
    pub candidate_skills: Vec<String>,
    pub resume_url: Option<String>,
    pub cover_letter: String,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub applied_at: DateTime<Utc>,
}

impl TryFrom<ApplicationDetailRow> for ApplicationDetail {
    type Error = UnknownStatus;

    fn try_from(row: ApplicationDetailRow) -> Result<Self, Self::Error> {
        Ok(ApplicationDetail {
            status: ApplicationStatus::parse(&row.status)?,
            application_id: row.app_id,
            job_id: row.job_id,
            candidate_id: row.candidate_id,
            job_title: row.job_title,
            candidate_name: row.candidate_name,
            candidate_email: row.candidate_email,
            candidate_phone: row.candidate_phone,
            candidate_location: row.candidate_location,
            candidate_experience: row.candidate_experience,
            candidate_education: row.candidate_education,
            candidate_summary: row.candidate_summary,
            candidate_skills: row.candidate_skills,
            resume_url: row
                .resume_id
                .map(|id| format!("/api/v1/resumes/{id}/download")),
            cover_letter: row.cover_letter.unwrap_or_default(),
            notes: row.recruiter_notes,
            applied_at: row.applied_at,
        })
    }
}

/// A candidate's request to apply; the job id comes from the path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationRequest {
    pub resume_id: Option<ResumeId>,
    pub cover_letter: Option<String>,
}

/// Recruiter status change. `status` is a raw token parsed by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationStatusChange {
    pub status: String,
    pub notes: Option<String>,
}
