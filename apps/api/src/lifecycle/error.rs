use serde::Serialize;
use thiserror::Error;

use crate::lifecycle::ports::StoreError;
use crate::lifecycle::status::{TransitionDenied, UnknownStatus};

/// Outcomes a lifecycle operation can report besides success.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("caller has no recruiter profile")]
    NotARecruiter,

    #[error("caller has no candidate profile")]
    NoProfile,

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    InvalidStatus(#[from] UnknownStatus),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionDenied),

    #[error("candidate has already applied for this job")]
    AlreadyApplied,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl LifecycleError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        LifecycleError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Result of a delete that is allowed to find nothing to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    Missing(String),
    Refused(String),
}

impl Deletion {
    pub fn is_deleted(&self) -> bool {
        matches!(self, Deletion::Deleted)
    }
}

/// Structured form of [`Deletion`] returned to recruiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status_code: u16,
}

impl From<Deletion> for DeletionReport {
    fn from(deletion: Deletion) -> Self {
        match deletion {
            Deletion::Deleted => DeletionReport {
                success: true,
                message: Some("deleted".to_string()),
                error: None,
                status_code: 200,
            },
            Deletion::Missing(error) => DeletionReport {
                success: false,
                message: None,
                error: Some(error),
                status_code: 404,
            },
            Deletion::Refused(error) => DeletionReport {
                success: false,
                message: None,
                error: Some(error),
                status_code: 403,
            },
        }
    }
}
