//! Status vocabulary for job posts and applications, plus the
//! (role, current state) → allowed next states table both lifecycle
//! services consult before persisting anything.
//!
//! Statuses only exist as strings at the edges: request bodies, query
//! strings and the `status` column. Everything in between uses the enums.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} status '{token}'")]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub token: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Actor roles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Candidate,
    Recruiter,
    Admin,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Recruiter => "recruiter",
            Role::Admin => "admin",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "candidate" => Some(Role::Candidate),
            "recruiter" => Some(Role::Recruiter),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job status
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum JobStatus {
    Draft,
    Pending,
    Open,
    Approved,
    Rejected,
    Closed,
    Paused,
}

impl JobStatus {
    pub const ALL: [JobStatus; 7] = [
        JobStatus::Draft,
        JobStatus::Pending,
        JobStatus::Open,
        JobStatus::Approved,
        JobStatus::Rejected,
        JobStatus::Closed,
        JobStatus::Paused,
    ];

    /// Statuses shown to candidates as active listings.
    pub const VISIBLE: [JobStatus; 2] = [JobStatus::Open, JobStatus::Approved];

    pub const fn as_str(self) -> &'static str {
        match self {
            JobStatus::Draft => "DRAFT",
            JobStatus::Pending => "PENDING",
            JobStatus::Open => "OPEN",
            JobStatus::Approved => "APPROVED",
            JobStatus::Rejected => "REJECTED",
            JobStatus::Closed => "CLOSED",
            JobStatus::Paused => "PAUSED",
        }
    }

    /// Case-insensitive; surrounding whitespace is ignored.
    pub fn parse(token: &str) -> Result<Self, UnknownStatus> {
        let normalized = token.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownStatus {
                kind: "job",
                token: token.to_string(),
            })
    }

    pub const fn is_visible(self) -> bool {
        matches!(self, JobStatus::Approved | JobStatus::Open)
    }

    /// Next states `role` may move a job to from `self`, excluding the
    /// identity move which [`check_job_transition`] always permits for
    /// writers.
    pub const fn allowed_next(self, role: Role) -> &'static [JobStatus] {
        use JobStatus::*;
        match role {
            Role::Recruiter => match self {
                Draft => &[Pending],
                Pending => &[Draft],
                Rejected => &[Draft, Pending],
                Approved | Open => &[Paused, Closed],
                Paused => &[Approved, Closed],
                Closed => &[],
            },
            // Moderation decisions are unconditional.
            Role::Admin => &[Approved, Rejected],
            Role::Candidate => &[],
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for JobStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Application status
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Shortlisted,
    Interview,
    Offered,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 7] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewing,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Interview,
        ApplicationStatus::Offered,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Reviewing => "REVIEWING",
            ApplicationStatus::Shortlisted => "SHORTLISTED",
            ApplicationStatus::Interview => "INTERVIEW",
            ApplicationStatus::Offered => "OFFERED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Withdrawn => "WITHDRAWN",
        }
    }

    pub fn parse(token: &str) -> Result<Self, UnknownStatus> {
        let normalized = token.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownStatus {
                kind: "application",
                token: token.to_string(),
            })
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Offered | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }

    /// Recruiters walk the pipeline one step at a time and may reject from
    /// any non-terminal state; candidates may only withdraw.
    pub const fn allowed_next(self, role: Role) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;
        if self.is_terminal() {
            return &[];
        }
        match role {
            Role::Recruiter => match self {
                Pending => &[Reviewing, Rejected],
                Reviewing => &[Shortlisted, Rejected],
                Shortlisted => &[Interview, Rejected],
                Interview => &[Offered, Rejected],
                Offered | Rejected | Withdrawn => &[],
            },
            Role::Candidate => &[Withdrawn],
            Role::Admin => &[],
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transition checks
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{role} may not move {entity} from {from} to {to}")]
pub struct TransitionDenied {
    pub entity: &'static str,
    pub role: Role,
    pub from: &'static str,
    pub to: &'static str,
}

pub fn check_job_transition(
    role: Role,
    from: JobStatus,
    to: JobStatus,
) -> Result<(), TransitionDenied> {
    let identity = from == to && role != Role::Candidate;
    if identity || from.allowed_next(role).contains(&to) {
        return Ok(());
    }
    Err(TransitionDenied {
        entity: "job",
        role,
        from: from.as_str(),
        to: to.as_str(),
    })
}

/// Identity moves are allowed only while the application is still open so
/// recruiters can attach notes without changing stage.
pub fn check_application_transition(
    role: Role,
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> Result<(), TransitionDenied> {
    let identity = from == to && role == Role::Recruiter && !from.is_terminal();
    if identity || from.allowed_next(role).contains(&to) {
        return Ok(());
    }
    Err(TransitionDenied {
        entity: "application",
        role,
        from: from.as_str(),
        to: to.as_str(),
    })
}
