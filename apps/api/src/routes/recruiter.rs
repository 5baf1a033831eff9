use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::lifecycle::status::Role;
use crate::lifecycle::{ApplicationLifecycle, DeletionReport, JobLifecycle};
use crate::models::application::{ApplicationDetail, ApplicationStatusChange, JobApplication};
use crate::models::ids::{ApplicationId, JobId};
use crate::models::job::{JobPost, JobUpdate, NewJobFields};
use crate::models::stats::RecruiterDashboard;
use crate::routes::actor::Actor;
use crate::state::AppState;

fn report_response(report: DeletionReport) -> (StatusCode, Json<DeletionReport>) {
    let status = StatusCode::from_u16(report.status_code).unwrap_or(StatusCode::OK);
    (status, Json(report))
}

/// GET /api/v1/recruiter/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<JobPost>>, AppError> {
    let actor = actor.require(Role::Recruiter)?;
    let store = state.store();
    let jobs = JobLifecycle::new(&store, &state.config.lifecycle)
        .list_recruiter_jobs(actor.user_id)
        .await?;
    Ok(Json(jobs))
}

/// POST /api/v1/recruiter/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    actor: Actor,
    Json(fields): Json<NewJobFields>,
) -> Result<(StatusCode, Json<JobPost>), AppError> {
    let actor = actor.require(Role::Recruiter)?;
    let store = state.store();
    let job = JobLifecycle::new(&store, &state.config.lifecycle)
        .create_job(actor.user_id, fields)
        .await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /api/v1/recruiter/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<JobId>,
    Json(update): Json<JobUpdate>,
) -> Result<Json<JobPost>, AppError> {
    let actor = actor.require(Role::Recruiter)?;
    let store = state.store();
    let job = JobLifecycle::new(&store, &state.config.lifecycle)
        .update_job(job_id, actor.user_id, update)
        .await?;
    Ok(Json(job))
}

/// POST /api/v1/recruiter/jobs/:id/submit
pub async fn handle_submit_job(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<JobId>,
) -> Result<Json<JobPost>, AppError> {
    let actor = actor.require(Role::Recruiter)?;
    let store = state.store();
    let job = JobLifecycle::new(&store, &state.config.lifecycle)
        .submit_for_review(job_id, actor.user_id)
        .await?;
    Ok(Json(job))
}

/// DELETE /api/v1/recruiter/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<JobId>,
) -> Result<(StatusCode, Json<DeletionReport>), AppError> {
    let actor = actor.require(Role::Recruiter)?;
    let store = state.store();
    let deletion = JobLifecycle::new(&store, &state.config.lifecycle)
        .delete_job(job_id, actor.user_id)
        .await?;
    Ok(report_response(deletion.into()))
}

/// GET /api/v1/recruiter/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<ApplicationDetail>>, AppError> {
    let actor = actor.require(Role::Recruiter)?;
    let store = state.store();
    let details = ApplicationLifecycle::new(&store, &store)
        .get_recruiter_applications_with_details(actor.user_id)
        .await?;
    Ok(Json(details))
}

/// PUT /api/v1/recruiter/applications/:id
pub async fn handle_update_application(
    State(state): State<AppState>,
    actor: Actor,
    Path(app_id): Path<ApplicationId>,
    Json(change): Json<ApplicationStatusChange>,
) -> Result<Json<JobApplication>, AppError> {
    let actor = actor.require(Role::Recruiter)?;
    let store = state.store();
    let application = ApplicationLifecycle::new(&store, &store)
        .update_application_status(app_id, actor.user_id, change)
        .await?;
    Ok(Json(application))
}

/// DELETE /api/v1/recruiter/applications/:id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    actor: Actor,
    Path(app_id): Path<ApplicationId>,
) -> Result<(StatusCode, Json<DeletionReport>), AppError> {
    let actor = actor.require(Role::Recruiter)?;
    let store = state.store();
    let report = ApplicationLifecycle::new(&store, &store)
        .delete_application(app_id, actor.user_id)
        .await?;
    Ok(report_response(report))
}

/// GET /api/v1/recruiter/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<RecruiterDashboard>, AppError> {
    let actor = actor.require(Role::Recruiter)?;
    let store = state.store();
    let dashboard = JobLifecycle::new(&store, &state.config.lifecycle)
        .recruiter_dashboard(actor.user_id)
        .await?;
    Ok(Json(dashboard))
}
