use axum::{
    Json,
    extract::{Query, State},
};
use bson::doc;
use serde::Serialize;
use wrenchly_db::models::{Shop, User, WaitlistEntry};
use wrenchly_services::dao::base::PaginationParams;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct AdminListResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct AdminWaitlistEntry {
    pub email: String,
    pub name: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct AdminShop {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub owner_id: String,
    pub is_active: bool,
}

pub async fn waitlist(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<AdminListResponse<AdminWaitlistEntry>>, ApiError> {
    let result = state
        .waitlist
        .base
        .find_paginated(doc! {}, Some(doc! { "created_at": -1 }), &params)
        .await?;

    Ok(Json(AdminListResponse {
        items: result
            .items
            .into_iter()
            .map(|e: WaitlistEntry| AdminWaitlistEntry {
                email: e.email,
                name: e.name,
                created_at: e.created_at.try_to_rfc3339_string().unwrap_or_default(),
            })
            .collect(),
        total: result.total,
        page: result.page,
        per_page: result.per_page,
        total_pages: result.total_pages,
    }))
}

pub async fn users(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<AdminListResponse<AdminUser>>, ApiError> {
    let result = state
        .users
        .base
        .find_paginated(doc! {}, Some(doc! { "created_at": -1 }), &params)
        .await?;

    Ok(Json(AdminListResponse {
        items: result
            .items
            .into_iter()
            .map(|u: User| AdminUser {
                id: u.id.map(|id| id.to_hex()).unwrap_or_default(),
                name: u.display_name(),
                email: u.email,
                role: u.role.as_str().to_string(),
                deleted: u.deleted_at.is_some(),
            })
            .collect(),
        total: result.total,
        page: result.page,
        per_page: result.per_page,
        total_pages: result.total_pages,
    }))
}

pub async fn shops(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<AdminListResponse<AdminShop>>, ApiError> {
    let result = state
        .shops
        .base
        .find_paginated(doc! {}, Some(doc! { "created_at": -1 }), &params)
        .await?;

    Ok(Json(AdminListResponse {
        items: result
            .items
            .into_iter()
            .map(|s: Shop| AdminShop {
                id: s.id.map(|id| id.to_hex()).unwrap_or_default(),
                name: s.name,
                slug: s.slug,
                owner_id: s.owner_id.to_hex(),
                is_active: s.is_active,
            })
            .collect(),
        total: result.total,
        page: result.page,
        per_page: result.per_page,
        total_pages: result.total_pages,
    }))
}
