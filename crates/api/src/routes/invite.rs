use axum::{
    Json,
    extract::{Path, State},
};
use bson::DateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;
use wrenchly_db::models::MemberRole;
use wrenchly_services::invite::{acceptance_state, AcceptanceState, IssueInvite};

use crate::{
    error::ApiError,
    extractors::auth::AuthUser,
    routes::parse_oid,
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct InviteRequest {
    #[validate(email)]
    pub email: String,
    pub role: String,
    pub shop_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub mechanic_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AcceptRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    pub shop_id: String,
}

/// Public projection used by the acceptance page to pick its UI state.
#[derive(Debug, Serialize)]
pub struct InvitationInfoResponse {
    pub status: &'static str,
    pub shop_id: String,
    pub shop_name: Option<String>,
    pub role: String,
    pub email: String,
    pub expires_at: String,
}

// ---- POST /api/invite ----------------------------------------------------

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<InviteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    body.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let role = MemberRole::parse(&body.role)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid role: {}", body.role)))?;
    let shop_id = parse_oid(&body.shop_id)?;
    let mechanic_id = body
        .mechanic_id
        .as_deref()
        .map(parse_oid)
        .transpose()?;

    state
        .invites
        .issue(
            &auth.user,
            IssueInvite {
                shop_id,
                email: body.email,
                role,
                first_name: body.first_name,
                last_name: body.last_name,
                title: body.title,
                mechanic_id,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({ "success": true })))
}

// ---- POST /api/invitations/accept ----------------------------------------

pub async fn accept(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<AcceptRequest>,
) -> Result<Json<AcceptResponse>, ApiError> {
    let shop_id = state.invites.accept_as_user(&body.token, &auth.user).await?;

    Ok(Json(AcceptResponse {
        shop_id: shop_id.to_hex(),
    }))
}

// ---- GET /api/invitations/{token} ----------------------------------------

pub async fn invitation_info(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<InvitationInfoResponse>, ApiError> {
    let invitation = state
        .invitations
        .find_by_token(&token)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invitation not found".to_string()))?;

    let status = match acceptance_state(&invitation, DateTime::now()) {
        AcceptanceState::Acceptable => "pending",
        AcceptanceState::AlreadyAccepted => "accepted",
        AcceptanceState::Revoked => "revoked",
        AcceptanceState::Expired => "expired",
    };

    let shop_name = state
        .shops
        .base
        .find_by_id(invitation.shop_id)
        .await
        .ok()
        .map(|s| s.name);

    Ok(Json(InvitationInfoResponse {
        status,
        shop_id: invitation.shop_id.to_hex(),
        shop_name,
        role: invitation.role.as_str().to_string(),
        email: invitation.email,
        expires_at: invitation
            .expires_at
            .try_to_rfc3339_string()
            .unwrap_or_default(),
    }))
}
