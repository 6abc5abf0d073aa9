use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use wrenchly_db::models::UserRole;

use crate::{error::ApiError, extractors::auth::resolve_user, state::AppState};

/// Route-level guard for the portal surface: shop owners, shop mechanics
/// and admins only. Unauthenticated requests get 401, authenticated ones
/// without a portal role get 403.
pub async fn require_portal_role(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (user, _) = resolve_user(&state, request.headers()).await?;

    if !user.role.can_access_portal() {
        return Err(ApiError::Forbidden(
            "Portal access requires a shop role".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Route-level guard for the admin surface.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (user, _) = resolve_user(&state, request.headers()).await?;

    if user.role != UserRole::Admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    Ok(next.run(request).await)
}
