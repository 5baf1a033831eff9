use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::lifecycle::status::{JobStatus, UnknownStatus};
use crate::models::ids::{CompanyId, JobId, RecruiterId};

/// Column list for every `job_posts` read. NUMERIC salaries are cast so
/// they decode as `f64`.
pub const JOB_COLUMNS: &str = "job_id, recruiter_id, company_id, title, description, \
     salary_min::float8 AS salary_min, salary_max::float8 AS salary_max, \
     location, job_type, application_deadline, status, rejection_reason, \
     created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct JobPostRow {
    pub job_id: JobId,
    pub recruiter_id: RecruiterId,
    pub company_id: Option<CompanyId>,
    pub title: String,
    pub description: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPost {
    pub job_id: JobId,
    pub recruiter_id: RecruiterId,
    pub company_id: Option<CompanyId>,
    pub title: String,
    pub description: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobPostRow> for JobPost {
    type Error = UnknownStatus;

    fn try_from(row: JobPostRow) -> Result<Self, Self::Error> {
        Ok(JobPost {
            status: JobStatus::parse(&row.status)?,
            job_id: row.job_id,
            recruiter_id: row.recruiter_id,
            company_id: row.company_id,
            title: row.title,
            description: row.description,
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            location: row.location,
            job_type: row.job_type,
            application_deadline: row.application_deadline,
            rejection_reason: row.rejection_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Fields a recruiter supplies when creating a job. There is no status or
/// recruiter field: both are decided by the lifecycle service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewJobFields {
    pub title: String,
    pub description: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub application_deadline: Option<DateTime<Utc>>,
}

/// Partial update. `None` leaves the stored value untouched; the status
/// arrives as a raw token and is parsed by the lifecycle service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

/// Public listing filters. `status` is a raw token; `None` means the
/// candidate-visible class.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilters {
    pub search: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
}

/// Filters after the lifecycle service has resolved the status token.
#[derive(Debug, Clone, PartialEq)]
pub struct JobQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    pub statuses: Vec<JobStatus>,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobPage {
    pub jobs: Vec<JobPost>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}
