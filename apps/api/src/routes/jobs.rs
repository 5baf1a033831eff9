//! Public job browsing plus the candidate-side endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::lifecycle::status::Role;
use crate::lifecycle::{ApplicationLifecycle, JobLifecycle};
use crate::models::application::{ApplicationRequest, JobApplication};
use crate::models::ids::{ApplicationId, JobId};
use crate::models::job::{JobFilters, JobPage, JobPost};
use crate::routes::actor::Actor;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListJobsParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<ListJobsParams>,
) -> Result<Json<JobPage>, AppError> {
    let store = state.store();
    let filters = JobFilters {
        search: params.search,
        location: params.location,
        status: params.status,
    };
    let page = JobLifecycle::new(&store, &state.config.lifecycle)
        .list_jobs(params.page, params.page_size, filters)
        .await?;
    Ok(Json(page))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> Result<Json<JobPost>, AppError> {
    let store = state.store();
    let job = JobLifecycle::new(&store, &state.config.lifecycle)
        .get_job(job_id)
        .await?;
    Ok(Json(job))
}

/// POST /api/v1/jobs/:id/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<JobId>,
    request: Option<Json<ApplicationRequest>>,
) -> Result<(StatusCode, Json<JobApplication>), AppError> {
    let actor = actor.require(Role::Candidate)?;
    let store = state.store();
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let application = ApplicationLifecycle::new(&store, &store)
        .submit_application(job_id, actor.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/v1/jobs/:id/applied
pub async fn handle_check_applied(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<JobId>,
) -> Result<Json<Value>, AppError> {
    let actor = actor.require(Role::Candidate)?;
    let store = state.store();
    let applied = ApplicationLifecycle::new(&store, &store)
        .check_existing_application(job_id, actor.user_id)
        .await?;
    Ok(Json(json!({ "job_id": job_id, "applied": applied })))
}

/// GET /api/v1/applications
pub async fn handle_my_applications(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<JobApplication>>, AppError> {
    let actor = actor.require(Role::Candidate)?;
    let store = state.store();
    let applications = ApplicationLifecycle::new(&store, &store)
        .get_user_applications(actor.user_id)
        .await?;
    Ok(Json(applications))
}

/// POST /api/v1/applications/:id/withdraw
pub async fn handle_withdraw(
    State(state): State<AppState>,
    actor: Actor,
    Path(app_id): Path<ApplicationId>,
) -> Result<Json<JobApplication>, AppError> {
    let actor = actor.require(Role::Candidate)?;
    let store = state.store();
    let application = ApplicationLifecycle::new(&store, &store)
        .withdraw_application(app_id, actor.user_id)
        .await?;
    Ok(Json(application))
}

/// GET /api/v1/saved-jobs
pub async fn handle_saved_jobs(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<JobPost>>, AppError> {
    let actor = actor.require(Role::Candidate)?;
    let store = state.store();
    let jobs = ApplicationLifecycle::new(&store, &store)
        .get_saved_jobs(actor.user_id)
        .await?;
    Ok(Json(jobs))
}

/// POST /api/v1/saved-jobs/:job_id
pub async fn handle_save_job(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<JobId>,
) -> Result<Json<Value>, AppError> {
    let actor = actor.require(Role::Candidate)?;
    let store = state.store();
    let saved = ApplicationLifecycle::new(&store, &store)
        .save_job(job_id, actor.user_id)
        .await?;
    Ok(Json(json!({ "job_id": job_id, "saved": saved })))
}

/// DELETE /api/v1/saved-jobs/:job_id
pub async fn handle_unsave_job(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<JobId>,
) -> Result<Json<Value>, AppError> {
    let actor = actor.require(Role::Candidate)?;
    let store = state.store();
    let removed = ApplicationLifecycle::new(&store, &store)
        .unsave_job(job_id, actor.user_id)
        .await?;
    Ok(Json(json!({ "job_id": job_id, "removed": removed })))
}
