use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::lifecycle::status::Role;
use crate::lifecycle::{AdminModeration, Rejection};
use crate::models::ids::JobId;
use crate::models::job::JobPost;
use crate::models::stats::DashboardStats;
use crate::routes::actor::Actor;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

/// GET /api/v1/admin/jobs?status=
/// Without a status the moderation queue (`PENDING`) is returned.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<JobPost>>, AppError> {
    actor.require(Role::Admin)?;
    let store = state.store();
    let admin = AdminModeration::new(&store, &store);
    let jobs = match query.status.as_deref() {
        Some(status) => admin.list_jobs_by_status(status).await?,
        None => admin.list_pending_jobs().await?,
    };
    Ok(Json(jobs))
}

/// GET /api/v1/admin/jobs/pending
pub async fn handle_pending_jobs(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<JobPost>>, AppError> {
    actor.require(Role::Admin)?;
    let store = state.store();
    let jobs = AdminModeration::new(&store, &store)
        .list_pending_jobs()
        .await?;
    Ok(Json(jobs))
}

/// POST /api/v1/admin/jobs/:id/approve
pub async fn handle_approve(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<JobId>,
) -> Result<Json<JobPost>, AppError> {
    actor.require(Role::Admin)?;
    let store = state.store();
    let job = AdminModeration::new(&store, &store)
        .approve_job(job_id)
        .await?;
    Ok(Json(job))
}

/// POST /api/v1/admin/jobs/:id/reject
pub async fn handle_reject(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<JobId>,
    body: Option<Json<RejectRequest>>,
) -> Result<Json<Rejection>, AppError> {
    actor.require(Role::Admin)?;
    let store = state.store();
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let rejection = AdminModeration::new(&store, &store)
        .reject_job(job_id, request.reason.as_deref())
        .await?;
    Ok(Json(rejection))
}

/// GET /api/v1/admin/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<DashboardStats>, AppError> {
    actor.require(Role::Admin)?;
    let store = state.store();
    let stats = AdminModeration::new(&store, &store)
        .dashboard_stats()
        .await?;
    Ok(Json(stats))
}
