use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use wrenchly_db::models::Mechanic;

use crate::{
    error::ApiError,
    extractors::auth::AuthUser,
    routes::{ensure_manager, ensure_member, parse_oid},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateMechanicRequest {
    pub name: String,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMechanicRequest {
    pub name: Option<String>,
    pub title: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct MechanicResponse {
    pub id: String,
    pub name: String,
    pub title: Option<String>,
    pub is_active: bool,
    pub rating_avg: f64,
    pub rating_count: u32,
}

impl MechanicResponse {
    fn from_mechanic(m: Mechanic) -> Self {
        Self {
            id: m.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: m.name,
            title: m.title,
            is_active: m.is_active,
            rating_avg: m.rating_avg,
            rating_count: m.rating_count,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(shop_id): Path<String>,
) -> Result<Json<Vec<MechanicResponse>>, ApiError> {
    let shop_id = parse_oid(&shop_id)?;
    ensure_member(&state, shop_id, &auth.user).await?;

    let mechanics = state.mechanics.list_by_shop(shop_id).await?;
    Ok(Json(
        mechanics
            .into_iter()
            .map(MechanicResponse::from_mechanic)
            .collect(),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(shop_id): Path<String>,
    Json(body): Json<CreateMechanicRequest>,
) -> Result<Json<MechanicResponse>, ApiError> {
    let shop_id = parse_oid(&shop_id)?;
    ensure_manager(&state, shop_id, &auth.user).await?;

    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }

    let mechanic = state
        .mechanics
        .create(shop_id, body.name.trim().to_string(), body.title)
        .await?;

    Ok(Json(MechanicResponse::from_mechanic(mechanic)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((shop_id, mechanic_id)): Path<(String, String)>,
    Json(body): Json<UpdateMechanicRequest>,
) -> Result<Json<MechanicResponse>, ApiError> {
    let shop_id = parse_oid(&shop_id)?;
    let mechanic_id = parse_oid(&mechanic_id)?;
    ensure_manager(&state, shop_id, &auth.user).await?;

    state
        .mechanics
        .update_profile(shop_id, mechanic_id, body.name, body.title)
        .await?;

    if let Some(active) = body.is_active {
        state
            .mechanics
            .set_active(shop_id, mechanic_id, active)
            .await?;
    }

    let mechanic = state
        .mechanics
        .base
        .find_by_id_in_shop(shop_id, mechanic_id)
        .await?;

    Ok(Json(MechanicResponse::from_mechanic(mechanic)))
}
