pub mod admin;
pub mod appointment;
pub mod invite;
pub mod job;
pub mod mechanic;
pub mod shop;
pub mod team;
pub mod user;
pub mod waitlist;
pub mod webhook;

use bson::oid::ObjectId;
use wrenchly_db::models::{User, UserRole};

use crate::{error::ApiError, state::AppState};

pub(crate) fn parse_oid(s: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(s).map_err(|_| ApiError::BadRequest(format!("Invalid id: {s}")))
}

pub(crate) fn user_oid(user: &User) -> Result<ObjectId, ApiError> {
    user.id
        .ok_or_else(|| ApiError::Internal("User record without id".to_string()))
}

/// Shop-scoped routes require an active membership; admins see every shop.
pub(crate) async fn ensure_member(
    state: &AppState,
    shop_id: ObjectId,
    user: &User,
) -> Result<(), ApiError> {
    if user.role == UserRole::Admin {
        return Ok(());
    }
    let user_id = user_oid(user)?;
    if state.shops.is_member(shop_id, user_id).await? {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Not a member of this shop".to_string()))
    }
}

/// Mutating team/profile routes additionally require an owner or manager
/// membership.
pub(crate) async fn ensure_manager(
    state: &AppState,
    shop_id: ObjectId,
    user: &User,
) -> Result<(), ApiError> {
    if user.role == UserRole::Admin {
        return Ok(());
    }
    let user_id = user_oid(user)?;
    let membership = state.shops.find_membership(shop_id, user_id).await?;
    if membership.is_some_and(|m| m.role.can_manage_team()) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Requires an owner or manager role in this shop".to_string(),
        ))
    }
}
