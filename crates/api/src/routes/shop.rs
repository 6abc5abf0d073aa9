use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;
use wrenchly_db::models::{Shop, ShopAddress, UserRole};
use wrenchly_services::dao::shop::NewShop;

use crate::{
    error::ApiError,
    extractors::auth::AuthUser,
    routes::{ensure_manager, ensure_member, parse_oid, user_oid},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateShopRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    #[serde(default)]
    pub address: ShopAddress,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateShopRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<ShopAddress>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShopResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub address: ShopAddress,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub owner_id: String,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub team_size: u64,
    pub pending_invitations: u64,
    pub open_jobs: u64,
    pub upcoming_appointments: u64,
}

impl ShopResponse {
    fn from_shop(shop: Shop) -> Self {
        Self {
            id: shop.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: shop.name,
            slug: shop.slug,
            description: shop.description,
            address: shop.address,
            phone: shop.phone,
            email: shop.email,
            owner_id: shop.owner_id.to_hex(),
            is_active: shop.is_active,
        }
    }
}

fn valid_slug(slug: &str) -> bool {
    slug.len() >= 3
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-')
}

// ---- POST /api/shops (setup flow) ----------------------------------------

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateShopRequest>,
) -> Result<Json<ShopResponse>, ApiError> {
    body.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if !valid_slug(&body.slug) {
        return Err(ApiError::BadRequest(
            "Slug must be at least 3 characters of lowercase letters, digits and hyphens"
                .to_string(),
        ));
    }

    let owner_id = user_oid(&auth.user)?;
    let shop = state
        .shops
        .create(
            NewShop {
                name: body.name,
                slug: body.slug,
                description: body.description,
                address: body.address,
                phone: body.phone,
                email: body.email,
            },
            owner_id,
        )
        .await?;

    // Setup flow: creating a shop is what makes an account a shop owner.
    if !matches!(auth.user.role, UserRole::Admin) {
        state.users.set_role(owner_id, UserRole::ShopOwner).await?;
    }

    Ok(Json(ShopResponse::from_shop(shop)))
}

// ---- GET /api/shops ------------------------------------------------------

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ShopResponse>>, ApiError> {
    let user_id = user_oid(&auth.user)?;
    let shops = state.shops.find_user_shops(user_id).await?;

    Ok(Json(shops.into_iter().map(ShopResponse::from_shop).collect()))
}

// ---- GET /api/portal/shops/{shop_id} -------------------------------------

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(shop_id): Path<String>,
) -> Result<Json<ShopResponse>, ApiError> {
    let shop_id = parse_oid(&shop_id)?;
    ensure_member(&state, shop_id, &auth.user).await?;

    let shop = state.shops.base.find_by_id(shop_id).await?;
    Ok(Json(ShopResponse::from_shop(shop)))
}

// ---- PUT /api/portal/shops/{shop_id} -------------------------------------

/// Update the shop profile. The slug is immutable and not accepted here.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(shop_id): Path<String>,
    Json(body): Json<UpdateShopRequest>,
) -> Result<Json<ShopResponse>, ApiError> {
    body.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let shop_id = parse_oid(&shop_id)?;
    ensure_manager(&state, shop_id, &auth.user).await?;

    state
        .shops
        .update_profile(
            shop_id,
            body.name,
            body.description,
            body.address,
            body.phone,
            body.email,
        )
        .await?;

    let shop = state.shops.base.find_by_id(shop_id).await?;
    Ok(Json(ShopResponse::from_shop(shop)))
}

// ---- GET /api/portal/shops/{shop_id}/dashboard ---------------------------

pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(shop_id): Path<String>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let shop_id = parse_oid(&shop_id)?;
    ensure_member(&state, shop_id, &auth.user).await?;

    let team_size = state
        .shops
        .members
        .count(bson::doc! { "shop_id": shop_id, "is_active": true })
        .await?;
    let pending_invitations = state.invitations.count_pending(shop_id).await?;
    let open_jobs = state.jobs.count_open(shop_id).await?;
    let upcoming_appointments = state.appointments.count_upcoming(shop_id).await?;

    Ok(Json(DashboardResponse {
        team_size,
        pending_invitations,
        open_jobs,
        upcoming_appointments,
    }))
}
