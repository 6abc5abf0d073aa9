use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::Validate;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct WaitlistRequest {
    #[validate(email)]
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistResponse {
    pub success: bool,
    pub message: String,
    pub confirmation_sent: bool,
    pub notification_sent: bool,
}

/// Landing-page waitlist capture. Email sends are best effort; the signup
/// itself succeeds regardless.
pub async fn join(
    State(state): State<AppState>,
    Json(body): Json<WaitlistRequest>,
) -> Result<Json<WaitlistResponse>, ApiError> {
    body.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let email = body.email.trim().to_lowercase();
    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from);

    let inserted = state.waitlist.add(&email, name.clone()).await?;

    let mut confirmation_sent = false;
    let mut notification_sent = false;

    if inserted {
        confirmation_sent = match state
            .email
            .waitlist_confirmation(&email, name.as_deref())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(email = %email, error = %e, "Waitlist confirmation email failed");
                false
            }
        };
        notification_sent = match state
            .email
            .waitlist_notification(&email, name.as_deref())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(email = %email, error = %e, "Waitlist notification email failed");
                false
            }
        };
    }

    let message = if inserted {
        "You're on the list! We'll be in touch soon.".to_string()
    } else {
        "You're already on the waitlist.".to_string()
    };

    Ok(Json(WaitlistResponse {
        success: true,
        message,
        confirmation_sent,
        notification_sent,
    }))
}
