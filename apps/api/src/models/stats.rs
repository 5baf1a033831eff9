use std::collections::BTreeMap;

use serde::Serialize;

use crate::lifecycle::status::JobStatus;

/// Counts for the admin dashboard, read from one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlatformCounts {
    pub jobs_by_status: BTreeMap<JobStatus, i64>,
    pub users_by_role: BTreeMap<String, i64>,
    pub applications: i64,
}

/// Counts for one recruiter's dashboard, read from one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecruiterCounts {
    pub jobs_by_status: BTreeMap<JobStatus, i64>,
    pub applications: i64,
    pub pending_applications: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_jobs: i64,
    pub pending_jobs: i64,
    pub active_jobs: i64,
    pub rejected_jobs: i64,
    pub jobs_by_status: BTreeMap<JobStatus, i64>,
    pub total_users: i64,
    pub users_by_role: BTreeMap<String, i64>,
    pub total_applications: i64,
}

impl From<PlatformCounts> for DashboardStats {
    fn from(counts: PlatformCounts) -> Self {
        let count = |status: JobStatus| counts.jobs_by_status.get(&status).copied().unwrap_or(0);
        DashboardStats {
            total_jobs: counts.jobs_by_status.values().sum(),
            pending_jobs: count(JobStatus::Pending),
            active_jobs: JobStatus::VISIBLE.into_iter().map(count).sum(),
            rejected_jobs: count(JobStatus::Rejected),
            total_users: counts.users_by_role.values().sum(),
            jobs_by_status: counts.jobs_by_status.clone(),
            users_by_role: counts.users_by_role.clone(),
            total_applications: counts.applications,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecruiterDashboard {
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub jobs_by_status: BTreeMap<JobStatus, i64>,
    pub total_applications: i64,
    pub pending_applications: i64,
}

impl From<RecruiterCounts> for RecruiterDashboard {
    fn from(counts: RecruiterCounts) -> Self {
        RecruiterDashboard {
            total_jobs: counts.jobs_by_status.values().sum(),
            active_jobs: JobStatus::VISIBLE
                .into_iter()
                .map(|status| counts.jobs_by_status.get(&status).copied().unwrap_or(0))
                .sum(),
            jobs_by_status: counts.jobs_by_status,
            total_applications: counts.applications,
            pending_applications: counts.pending_applications,
        }
    }
}
