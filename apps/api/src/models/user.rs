use serde::Serialize;
use sqlx::FromRow;

use crate::models::ids::{CandidateId, CompanyId, RecruiterId, UserId};

/// Recruiter profile; jobs are owned by `recruiter_id`, never by the user.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct RecruiterProfile {
    pub recruiter_id: RecruiterId,
    pub user_id: UserId,
    pub company_id: Option<CompanyId>,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CandidateProfile {
    pub candidate_id: CandidateId,
    pub user_id: UserId,
    pub full_name: String,
}
