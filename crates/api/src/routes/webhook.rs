use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::{debug, info, warn};
use wrenchly_db::models::UserRole;
use wrenchly_services::clerk::{ClerkEvent, ClerkService, ClerkUser};

use crate::{error::ApiError, state::AppState};

/// Identity-provider lifecycle webhook.
///
/// The handler is a thin event-to-command translator: signature check,
/// payload parse, then a dispatch into the same DAO/reconcile operations
/// the page-driven paths use. Acceptance triggered from here is best
/// effort and never fails the delivery.
pub async fn clerk(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let msg_id = header(&headers, "svix-id")?;
    let timestamp = header(&headers, "svix-timestamp")?;
    let signature = header(&headers, "svix-signature")?;

    ClerkService::verify_webhook(
        &state.settings.clerk.webhook_secret,
        msg_id,
        timestamp,
        signature,
        &body,
    )
    .map_err(|_| ApiError::BadRequest("Invalid webhook signature".to_string()))?;

    let event: ClerkEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid event payload: {e}")))?;

    match event.event_type.as_str() {
        "user.created" | "user.updated" => {
            upsert_user(&state, event.data).await?;
        }
        "user.deleted" => {
            let clerk_user_id = event.data["id"]
                .as_str()
                .ok_or_else(|| ApiError::BadRequest("Deletion event without id".to_string()))?;
            state.users.mark_deleted(clerk_user_id).await?;
            info!(clerk_user_id, "User soft-deleted from provider event");
        }
        "invitation.accepted" => {
            invitation_accepted(&state, &event.data).await;
        }
        other => {
            debug!(event_type = other, "Ignoring provider event");
        }
    }

    Ok(StatusCode::OK)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing {name} header")))
}

async fn upsert_user(state: &AppState, data: serde_json::Value) -> Result<(), ApiError> {
    let payload: ClerkUser = serde_json::from_value(data)
        .map_err(|e| ApiError::BadRequest(format!("Malformed user payload: {e}")))?;

    let email = payload
        .primary_email()
        .ok_or_else(|| ApiError::BadRequest("User event without a primary email".to_string()))?
        .to_lowercase();

    let role = payload
        .public_metadata
        .get("role")
        .and_then(|v| v.as_str())
        .and_then(UserRole::parse);

    state
        .users
        .upsert_from_clerk(
            &payload.id,
            &email,
            payload.first_name.clone(),
            payload.last_name.clone(),
            payload.image_url.clone(),
            role,
        )
        .await?;

    // New accounts never hit the page-driven acceptance path before this
    // event, so reconcile here using whatever metadata made it across.
    let token = payload
        .public_metadata
        .get("invitation_token")
        .and_then(|v| v.as_str());

    match state
        .invites
        .accept_for_clerk_user(&payload.id, &email, token)
        .await
    {
        Ok(Some(shop_id)) => {
            info!(clerk_user_id = %payload.id, shop_id = %shop_id, "Invitation reconciled from webhook");
        }
        Ok(None) => {}
        Err(e) => {
            warn!(clerk_user_id = %payload.id, error = %e, "Webhook invitation reconcile failed");
        }
    }

    Ok(())
}

async fn invitation_accepted(state: &AppState, data: &serde_json::Value) {
    let (Some(invitation_id), Some(email)) = (
        data["id"].as_str(),
        data["email_address"].as_str(),
    ) else {
        warn!("Invitation-accepted event missing id or email");
        return;
    };

    match state
        .invites
        .accept_by_clerk_invitation(invitation_id, &email.to_lowercase())
        .await
    {
        Ok(Some(shop_id)) => {
            info!(clerk_invitation_id = invitation_id, shop_id = %shop_id, "Invitation reconciled from provider event");
        }
        Ok(None) => {
            debug!(clerk_invitation_id = invitation_id, "No matching local invitation");
        }
        Err(e) => {
            warn!(clerk_invitation_id = invitation_id, error = %e, "Invitation-accepted reconcile failed");
        }
    }
}
