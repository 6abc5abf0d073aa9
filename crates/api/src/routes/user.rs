use axum::{Json, extract::State};
use serde::Serialize;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub clerk_user_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
    pub avatar_url: Option<String>,
}

pub async fn me(
    State(_state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = auth.user;

    Ok(Json(MeResponse {
        id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
        clerk_user_id: user.clerk_user_id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        role: user.role.as_str().to_string(),
        avatar_url: user.avatar_url,
    }))
}
