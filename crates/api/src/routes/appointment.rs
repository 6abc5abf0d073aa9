use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime as ChronoDateTime, Utc};
use serde::{Deserialize, Serialize};
use wrenchly_db::models::{Appointment, AppointmentStatus};

use crate::{
    error::ApiError,
    extractors::auth::AuthUser,
    routes::{ensure_member, parse_oid},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub customer_name: String,
    pub scheduled_at: ChronoDateTime<Utc>,
    pub duration_mins: Option<u32>,
    pub job_id: Option<String>,
    pub mechanic_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct AppointmentResponse {
    pub id: String,
    pub customer_name: String,
    pub scheduled_at: String,
    pub duration_mins: u32,
    pub job_id: Option<String>,
    pub mechanic_id: Option<String>,
    pub status: String,
    pub notes: Option<String>,
}

impl AppointmentResponse {
    fn from_appointment(a: Appointment) -> Self {
        Self {
            id: a.id.map(|id| id.to_hex()).unwrap_or_default(),
            customer_name: a.customer_name,
            scheduled_at: a.scheduled_at.try_to_rfc3339_string().unwrap_or_default(),
            duration_mins: a.duration_mins,
            job_id: a.job_id.map(|id| id.to_hex()),
            mechanic_id: a.mechanic_id.map(|id| id.to_hex()),
            status: a.status.as_str().to_string(),
            notes: a.notes,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(shop_id): Path<String>,
) -> Result<Json<Vec<AppointmentResponse>>, ApiError> {
    let shop_id = parse_oid(&shop_id)?;
    ensure_member(&state, shop_id, &auth.user).await?;

    let appointments = state.appointments.list_by_shop(shop_id).await?;
    Ok(Json(
        appointments
            .into_iter()
            .map(AppointmentResponse::from_appointment)
            .collect(),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(shop_id): Path<String>,
    Json(body): Json<CreateAppointmentRequest>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let shop_id = parse_oid(&shop_id)?;
    ensure_member(&state, shop_id, &auth.user).await?;

    if body.customer_name.trim().is_empty() {
        return Err(ApiError::BadRequest("Customer name is required".to_string()));
    }

    let job_id = body.job_id.as_deref().map(parse_oid).transpose()?;
    let mechanic_id = body.mechanic_id.as_deref().map(parse_oid).transpose()?;

    let appointment = state
        .appointments
        .create(
            shop_id,
            job_id,
            body.customer_name.trim().to_string(),
            bson::DateTime::from_chrono(body.scheduled_at),
            body.duration_mins.unwrap_or(60),
            mechanic_id,
            body.notes,
        )
        .await?;

    Ok(Json(AppointmentResponse::from_appointment(appointment)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((shop_id, appointment_id)): Path<(String, String)>,
    Json(body): Json<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let shop_id = parse_oid(&shop_id)?;
    let appointment_id = parse_oid(&appointment_id)?;
    ensure_member(&state, shop_id, &auth.user).await?;

    let status = AppointmentStatus::parse(&body.status)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid status: {}", body.status)))?;

    state
        .appointments
        .set_status(shop_id, appointment_id, status)
        .await?;

    let appointment = state
        .appointments
        .base
        .find_by_id_in_shop(shop_id, appointment_id)
        .await?;

    Ok(Json(AppointmentResponse::from_appointment(appointment)))
}
