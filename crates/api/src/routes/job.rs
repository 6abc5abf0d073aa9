use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use wrenchly_db::models::{Job, JobStatus};

use crate::{
    error::ApiError,
    extractors::auth::AuthUser,
    routes::{ensure_member, parse_oid},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub customer_name: String,
    pub vehicle: String,
    pub description: Option<String>,
    pub mechanic_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateJobRequest {
    pub status: Option<String>,
    pub mechanic_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: String,
    pub customer_name: String,
    pub vehicle: String,
    pub description: Option<String>,
    pub status: String,
    pub mechanic_id: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl JobResponse {
    fn from_job(job: Job) -> Self {
        Self {
            id: job.id.map(|id| id.to_hex()).unwrap_or_default(),
            customer_name: job.customer_name,
            vehicle: job.vehicle,
            description: job.description,
            status: job.status.as_str().to_string(),
            mechanic_id: job.mechanic_id.map(|id| id.to_hex()),
            created_at: job.created_at.try_to_rfc3339_string().unwrap_or_default(),
            completed_at: job
                .completed_at
                .and_then(|d| d.try_to_rfc3339_string().ok()),
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(shop_id): Path<String>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<Vec<JobResponse>>, ApiError> {
    let shop_id = parse_oid(&shop_id)?;
    ensure_member(&state, shop_id, &auth.user).await?;

    let status = match query.status.as_deref() {
        Some(s) => Some(
            JobStatus::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid status: {s}")))?,
        ),
        None => None,
    };

    let jobs = state.jobs.list_by_shop(shop_id, status).await?;
    Ok(Json(jobs.into_iter().map(JobResponse::from_job).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(shop_id): Path<String>,
    Json(body): Json<CreateJobRequest>,
) -> Result<Json<JobResponse>, ApiError> {
    let shop_id = parse_oid(&shop_id)?;
    ensure_member(&state, shop_id, &auth.user).await?;

    if body.customer_name.trim().is_empty() || body.vehicle.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Customer name and vehicle are required".to_string(),
        ));
    }

    let mechanic_id = body.mechanic_id.as_deref().map(parse_oid).transpose()?;

    let job = state
        .jobs
        .create(
            shop_id,
            body.customer_name.trim().to_string(),
            body.vehicle.trim().to_string(),
            body.description,
            mechanic_id,
        )
        .await?;

    Ok(Json(JobResponse::from_job(job)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((shop_id, job_id)): Path<(String, String)>,
    Json(body): Json<UpdateJobRequest>,
) -> Result<Json<JobResponse>, ApiError> {
    let shop_id = parse_oid(&shop_id)?;
    let job_id = parse_oid(&job_id)?;
    ensure_member(&state, shop_id, &auth.user).await?;

    if let Some(status) = body.status.as_deref() {
        let status = JobStatus::parse(status)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid status: {status}")))?;
        state.jobs.set_status(shop_id, job_id, status).await?;
    }

    if let Some(mechanic_id) = body.mechanic_id.as_deref() {
        let mechanic_id = if mechanic_id.is_empty() {
            None
        } else {
            Some(parse_oid(mechanic_id)?)
        };
        state.jobs.assign_mechanic(shop_id, job_id, mechanic_id).await?;
    }

    let job = state.jobs.base.find_by_id_in_shop(shop_id, job_id).await?;
    Ok(Json(JobResponse::from_job(job)))
}
