use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::lifecycle::ports::{ApplicationRepository, JobRepository, StatsRepository, StoreError};
use crate::lifecycle::status::{ApplicationStatus, JobStatus};
use crate::models::application::{
    ApplicationDetail, ApplicationDetailRow, JobApplication, JobApplicationRow,
    APPLICATION_COLUMNS,
};
use crate::models::ids::{ApplicationId, CandidateId, JobId, RecruiterId, UserId};
use crate::models::job::{JobPost, JobPostRow, JobQuery, JOB_COLUMNS};
use crate::models::stats::{PlatformCounts, RecruiterCounts};
use crate::models::user::{CandidateProfile, RecruiterProfile};

/// All three lifecycle ports over one connection pool. Cloning is cheap.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    /// Opens a read-only transaction whose reads all see one snapshot.
    async fn snapshot(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

fn jobs_from_rows(rows: Vec<JobPostRow>) -> Result<Vec<JobPost>, StoreError> {
    rows.into_iter()
        .map(|row| JobPost::try_from(row).map_err(StoreError::from))
        .collect()
}

fn applications_from_rows(rows: Vec<JobApplicationRow>) -> Result<Vec<JobApplication>, StoreError> {
    rows.into_iter()
        .map(|row| JobApplication::try_from(row).map_err(StoreError::from))
        .collect()
}

fn status_counts(rows: Vec<(String, i64)>) -> Result<BTreeMap<JobStatus, i64>, StoreError> {
    let mut counts = BTreeMap::new();
    for (token, count) in rows {
        counts.insert(JobStatus::parse(&token)?, count);
    }
    Ok(counts)
}

/// Substring pattern for `ILIKE ... ESCAPE '\'`, with the wildcards in
/// `raw` matched literally.
fn contains_pattern(raw: &str) -> String {
    let mut pattern = String::with_capacity(raw.len() + 2);
    pattern.push('%');
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn raw_ids(job_ids: &[JobId]) -> Vec<Uuid> {
    job_ids.iter().map(|id| id.0).collect()
}

#[async_trait]
impl JobRepository for PgStore {
    async fn recruiter_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<RecruiterProfile>, StoreError> {
        Ok(sqlx::query_as::<_, RecruiterProfile>(
            "SELECT recruiter_id, user_id, company_id, full_name
             FROM recruiter_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_job(&self, job: &JobPost) -> Result<JobPost, StoreError> {
        let sql = format!(
            "INSERT INTO job_posts
                (job_id, recruiter_id, company_id, title, description, salary_min, salary_max,
                 location, job_type, application_deadline, status, rejection_reason,
                 created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6::numeric, $7::numeric, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {JOB_COLUMNS}"
        );
        let row = sqlx::query_as::<_, JobPostRow>(&sql)
            .bind(job.job_id)
            .bind(job.recruiter_id)
            .bind(job.company_id)
            .bind(&job.title)
            .bind(&job.description)
            .bind(job.salary_min)
            .bind(job.salary_max)
            .bind(&job.location)
            .bind(&job.job_type)
            .bind(job.application_deadline)
            .bind(job.status.as_str())
            .bind(&job.rejection_reason)
            .bind(job.created_at)
            .bind(job.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(JobPost::try_from(row)?)
    }

    async fn job_by_id(&self, job_id: JobId) -> Result<Option<JobPost>, StoreError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM job_posts WHERE job_id = $1");
        let row = sqlx::query_as::<_, JobPostRow>(&sql)
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(JobPost::try_from).transpose()?)
    }

    async fn update_job(
        &self,
        job: &JobPost,
        write_status: bool,
    ) -> Result<Option<JobPost>, StoreError> {
        let sql = format!(
            "UPDATE job_posts SET
                title = $2, description = $3, salary_min = $4::numeric, salary_max = $5::numeric,
                location = $6, job_type = $7, application_deadline = $8,
                status = CASE WHEN $11 THEN $9 ELSE status END,
                rejection_reason = CASE WHEN $11 THEN $10 ELSE rejection_reason END,
                updated_at = now()
             WHERE job_id = $1
             RETURNING {JOB_COLUMNS}"
        );
        let row = sqlx::query_as::<_, JobPostRow>(&sql)
            .bind(job.job_id)
            .bind(&job.title)
            .bind(&job.description)
            .bind(job.salary_min)
            .bind(job.salary_max)
            .bind(&job.location)
            .bind(&job.job_type)
            .bind(job.application_deadline)
            .bind(job.status.as_str())
            .bind(&job.rejection_reason)
            .bind(write_status)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(JobPost::try_from).transpose()?)
    }

    async fn update_job_status(
        &self,
        job_id: JobId,
        status: JobStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<JobPost>, StoreError> {
        let sql = format!(
            "UPDATE job_posts SET status = $2, rejection_reason = $3, updated_at = now()
             WHERE job_id = $1
             RETURNING {JOB_COLUMNS}"
        );
        let row = sqlx::query_as::<_, JobPostRow>(&sql)
            .bind(job_id)
            .bind(status.as_str())
            .bind(rejection_reason)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(JobPost::try_from).transpose()?)
    }

    async fn delete_job_cascade(&self, job_id: JobId) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock the job row so no application can be inserted against it
        // between the dependent deletes and the job delete.
        let locked: Option<JobId> =
            sqlx::query_scalar("SELECT job_id FROM job_posts WHERE job_id = $1 FOR UPDATE")
                .bind(job_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM job_applications WHERE job_id = $1")
            .bind(job_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM saved_jobs WHERE job_id = $1")
            .bind(job_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM job_posts WHERE job_id = $1")
            .bind(job_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<(Vec<JobPost>, i64), StoreError> {
        const FILTER: &str = r"status = ANY($1)
              AND ($2::text IS NULL OR title ILIKE $2 ESCAPE '\'
                   OR description ILIKE $2 ESCAPE '\')
              AND ($3::text IS NULL OR location ILIKE $3 ESCAPE '\')";

        let statuses: Vec<&str> = query.statuses.iter().map(|s| s.as_str()).collect();
        let search = query.search.as_deref().map(contains_pattern);
        let location = query.location.as_deref().map(contains_pattern);

        let count_sql = format!("SELECT COUNT(*) FROM job_posts WHERE {FILTER}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&statuses)
            .bind(&search)
            .bind(&location)
            .fetch_one(&self.pool)
            .await?;

        let page_sql = format!(
            "SELECT {JOB_COLUMNS} FROM job_posts WHERE {FILTER}
             ORDER BY created_at DESC
             LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query_as::<_, JobPostRow>(&page_sql)
            .bind(&statuses)
            .bind(&search)
            .bind(&location)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((jobs_from_rows(rows)?, total))
    }

    async fn jobs_by_recruiter(
        &self,
        recruiter_id: RecruiterId,
    ) -> Result<Vec<JobPost>, StoreError> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM job_posts WHERE recruiter_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, JobPostRow>(&sql)
            .bind(recruiter_id)
            .fetch_all(&self.pool)
            .await?;
        jobs_from_rows(rows)
    }

    async fn jobs_by_status(&self, status: JobStatus) -> Result<Vec<JobPost>, StoreError> {
        let sql =
            format!("SELECT {JOB_COLUMNS} FROM job_posts WHERE status = $1 ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, JobPostRow>(&sql)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;
        jobs_from_rows(rows)
    }

    async fn recruiter_counts(
        &self,
        recruiter_id: RecruiterId,
    ) -> Result<RecruiterCounts, StoreError> {
        let mut tx = self.snapshot().await?;

        let by_status: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM job_posts WHERE recruiter_id = $1 GROUP BY status",
        )
        .bind(recruiter_id)
        .fetch_all(&mut *tx)
        .await?;

        let (applications, pending_applications): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE a.status = 'PENDING')
             FROM job_applications a
             JOIN job_posts j ON j.job_id = a.job_id
             WHERE j.recruiter_id = $1",
        )
        .bind(recruiter_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(RecruiterCounts {
            jobs_by_status: status_counts(by_status)?,
            applications,
            pending_applications,
        })
    }
}

#[async_trait]
impl ApplicationRepository for PgStore {
    async fn candidate_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<CandidateProfile>, StoreError> {
        Ok(sqlx::query_as::<_, CandidateProfile>(
            "SELECT candidate_id, user_id, full_name FROM candidate_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn has_live_application(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<bool, StoreError> {
        Ok(sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM job_applications
                WHERE candidate_id = $1 AND job_id = $2 AND status <> 'WITHDRAWN'
             )",
        )
        .bind(candidate_id)
        .bind(job_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn insert_application(
        &self,
        application: &JobApplication,
    ) -> Result<JobApplication, StoreError> {
        let sql = format!(
            "INSERT INTO job_applications
                (app_id, job_id, candidate_id, resume_id, cover_letter, status,
                 recruiter_notes, applied_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {APPLICATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, JobApplicationRow>(&sql)
            .bind(application.app_id)
            .bind(application.job_id)
            .bind(application.candidate_id)
            .bind(application.resume_id)
            .bind(&application.cover_letter)
            .bind(application.status.as_str())
            .bind(&application.recruiter_notes)
            .bind(application.applied_at)
            .bind(application.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(JobApplication::try_from(row)?)
    }

    async fn application_by_id(
        &self,
        app_id: ApplicationId,
    ) -> Result<Option<JobApplication>, StoreError> {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM job_applications WHERE app_id = $1");
        let row = sqlx::query_as::<_, JobApplicationRow>(&sql)
            .bind(app_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(JobApplication::try_from).transpose()?)
    }

    async fn update_application_status(
        &self,
        app_id: ApplicationId,
        expected: ApplicationStatus,
        status: ApplicationStatus,
        notes: Option<&str>,
    ) -> Result<Option<JobApplication>, StoreError> {
        let sql = format!(
            "UPDATE job_applications
             SET status = $3, recruiter_notes = COALESCE($4, recruiter_notes), updated_at = now()
             WHERE app_id = $1 AND status = $2
             RETURNING {APPLICATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, JobApplicationRow>(&sql)
            .bind(app_id)
            .bind(expected.as_str())
            .bind(status.as_str())
            .bind(notes)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(JobApplication::try_from).transpose()?)
    }

    async fn delete_application(&self, app_id: ApplicationId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM job_applications WHERE app_id = $1")
            .bind(app_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn applications_by_candidate(
        &self,
        candidate_id: CandidateId,
    ) -> Result<Vec<JobApplication>, StoreError> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM job_applications
             WHERE candidate_id = $1 ORDER BY applied_at DESC"
        );
        let rows = sqlx::query_as::<_, JobApplicationRow>(&sql)
            .bind(candidate_id)
            .fetch_all(&self.pool)
            .await?;
        applications_from_rows(rows)
    }

    async fn applications_for_jobs(
        &self,
        job_ids: &[JobId],
    ) -> Result<Vec<JobApplication>, StoreError> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM job_applications
             WHERE job_id = ANY($1) ORDER BY applied_at DESC"
        );
        let rows = sqlx::query_as::<_, JobApplicationRow>(&sql)
            .bind(raw_ids(job_ids))
            .fetch_all(&self.pool)
            .await?;
        applications_from_rows(rows)
    }

    async fn application_details_for_jobs(
        &self,
        job_ids: &[JobId],
    ) -> Result<Vec<ApplicationDetail>, StoreError> {
        let rows = sqlx::query_as::<_, ApplicationDetailRow>(
            "SELECT a.app_id, a.job_id, a.candidate_id,
                    j.title AS job_title,
                    c.full_name AS candidate_name,
                    u.email AS candidate_email,
                    c.phone AS candidate_phone,
                    c.location AS candidate_location,
                    c.experience_years AS candidate_experience,
                    c.education AS candidate_education,
                    c.bio AS candidate_summary,
                    ARRAY(
                        SELECT s.name FROM candidate_skills cs
                        JOIN skills s ON s.skill_id = cs.skill_id
                        WHERE cs.candidate_id = c.candidate_id
                        ORDER BY s.name
                    ) AS candidate_skills,
                    a.resume_id, a.cover_letter, a.status, a.recruiter_notes, a.applied_at
             FROM job_applications a
             JOIN job_posts j ON j.job_id = a.job_id
             JOIN candidate_profiles c ON c.candidate_id = a.candidate_id
             JOIN users u ON u.user_id = c.user_id
             WHERE a.job_id = ANY($1)
             ORDER BY a.applied_at DESC",
        )
        .bind(raw_ids(job_ids))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| ApplicationDetail::try_from(row).map_err(StoreError::from))
            .collect()
    }

    async fn insert_saved_job(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO saved_jobs (candidate_id, job_id) VALUES ($1, $2)
             ON CONFLICT (candidate_id, job_id) DO NOTHING",
        )
        .bind(candidate_id)
        .bind(job_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_saved_job(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM saved_jobs WHERE candidate_id = $1 AND job_id = $2")
            .bind(candidate_id)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn saved_jobs_for(&self, candidate_id: CandidateId) -> Result<Vec<JobPost>, StoreError> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM job_posts
             WHERE job_id IN (SELECT job_id FROM saved_jobs WHERE candidate_id = $1)
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, JobPostRow>(&sql)
            .bind(candidate_id)
            .fetch_all(&self.pool)
            .await?;
        jobs_from_rows(rows)
    }
}

#[async_trait]
impl StatsRepository for PgStore {
    async fn platform_counts(&self) -> Result<PlatformCounts, StoreError> {
        let mut tx = self.snapshot().await?;

        let jobs: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM job_posts GROUP BY status")
                .fetch_all(&mut *tx)
                .await?;
        let users: Vec<(String, i64)> =
            sqlx::query_as("SELECT LOWER(role), COUNT(*) FROM users GROUP BY LOWER(role)")
                .fetch_all(&mut *tx)
                .await?;
        let applications: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM job_applications")
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(PlatformCounts {
            jobs_by_status: status_counts(jobs)?,
            users_by_role: users.into_iter().collect(),
            applications,
        })
    }
}
