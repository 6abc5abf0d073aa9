use axum::{
    Json,
    extract::{Path, State},
};
use bson::DateTime;
use serde::Serialize;
use wrenchly_services::invite::{acceptance_state, AcceptanceState};

use crate::{
    error::ApiError,
    extractors::auth::AuthUser,
    routes::{ensure_member, parse_oid},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct TeamMemberResponse {
    pub member_id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub mechanic_id: Option<String>,
    pub accepted_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub id: String,
    pub email: String,
    pub role: String,
    pub status: &'static str,
    pub mechanic_id: Option<String>,
    pub created_at: String,
    pub expires_at: String,
}

// ---- GET /api/portal/shops/{shop_id}/team --------------------------------

pub async fn members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(shop_id): Path<String>,
) -> Result<Json<Vec<TeamMemberResponse>>, ApiError> {
    let shop_id = parse_oid(&shop_id)?;
    ensure_member(&state, shop_id, &auth.user).await?;

    let team = state.shops.get_team_members(shop_id).await?;

    let response = team
        .into_iter()
        .map(|(member, user)| TeamMemberResponse {
            member_id: member.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: member.user_id.to_hex(),
            name: user.display_name(),
            email: user.email,
            role: member.role.as_str().to_string(),
            mechanic_id: member.mechanic_id.map(|id| id.to_hex()),
            accepted_at: member
                .accepted_at
                .and_then(|d| d.try_to_rfc3339_string().ok()),
        })
        .collect();

    Ok(Json(response))
}

// ---- GET /api/portal/shops/{shop_id}/invitations -------------------------

/// Invitation history, newest first. Expiry is computed at read time, so
/// a stored-pending invitation past its deadline shows as expired.
pub async fn invitations(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(shop_id): Path<String>,
) -> Result<Json<Vec<InvitationResponse>>, ApiError> {
    let shop_id = parse_oid(&shop_id)?;
    ensure_member(&state, shop_id, &auth.user).await?;

    let invitations = state.invitations.list_by_shop(shop_id).await?;
    let now = DateTime::now();

    let response = invitations
        .into_iter()
        .map(|inv| {
            let status = match acceptance_state(&inv, now) {
                AcceptanceState::Acceptable => "pending",
                AcceptanceState::AlreadyAccepted => "accepted",
                AcceptanceState::Revoked => "revoked",
                AcceptanceState::Expired => "expired",
            };
            InvitationResponse {
                id: inv.id.map(|id| id.to_hex()).unwrap_or_default(),
                email: inv.email,
                role: inv.role.as_str().to_string(),
                status,
                mechanic_id: inv.mechanic_id.map(|id| id.to_hex()),
                created_at: inv.created_at.try_to_rfc3339_string().unwrap_or_default(),
                expires_at: inv.expires_at.try_to_rfc3339_string().unwrap_or_default(),
            }
        })
        .collect();

    Ok(Json(response))
}

// ---- DELETE /api/portal/shops/{shop_id}/invitations/{invitation_id} ------

pub async fn revoke(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((shop_id, invitation_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let shop_id = parse_oid(&shop_id)?;
    let invitation_id = parse_oid(&invitation_id)?;

    // Scope the id to the shop in the path before touching it.
    state
        .invitations
        .base
        .find_by_id_in_shop(shop_id, invitation_id)
        .await?;

    state.invites.revoke(invitation_id, &auth.user).await?;

    Ok(Json(serde_json::json!({ "success": true })))
}
