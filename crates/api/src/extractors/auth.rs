use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use wrenchly_db::models::User;
use wrenchly_services::auth::SessionClaims;
use wrenchly_services::dao::base::DaoError;

use crate::{error::ApiError, state::AppState};

/// The authenticated caller: verified provider session plus the local
/// user record mirrored by the webhook.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub claims: SessionClaims,
}

/// Pull the session token from the Authorization header or the provider's
/// `__session` cookie and resolve it to a local user.
pub(crate) async fn resolve_user(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(User, SessionClaims), ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        cookie
                            .trim()
                            .strip_prefix("__session=")
                            .map(|s| s.to_string())
                    })
                })
        })
        .ok_or_else(|| ApiError::Unauthorized("No session token provided".to_string()))?;

    let claims = state.auth.verify_session(&token)?;

    let user = state
        .users
        .find_by_clerk_id(&claims.sub)
        .await
        .map_err(|e| match e {
            DaoError::NotFound => {
                ApiError::Unauthorized("No local account for this session".to_string())
            }
            other => other.into(),
        })?;

    Ok((user, claims))
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let (user, claims) = resolve_user(&app_state, &parts.headers).await?;
        Ok(AuthUser { user, claims })
    }
}

/// Helper trait for extracting AppState from composite state types
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

impl FromRef<AppState> for AppState {
    fn from_ref(input: &AppState) -> Self {
        input.clone()
    }
}
