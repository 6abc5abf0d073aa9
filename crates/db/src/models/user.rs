use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Local mirror of an identity-provider account.
///
/// Created and updated exclusively by the webhook upsert; the identity
/// provider stays the system of record for credentials and sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub clerk_user_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    pub avatar_url: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub deleted_at: Option<DateTime>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    ShopOwner,
    ShopMechanic,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::ShopOwner => "shop_owner",
            UserRole::ShopMechanic => "shop_mechanic",
            UserRole::Admin => "admin",
        }
    }

    /// Parse a role string from provider public metadata.
    ///
    /// Legacy accounts carry the bare "mechanic" value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(UserRole::User),
            "shop_owner" => Some(UserRole::ShopOwner),
            "shop_mechanic" | "mechanic" => Some(UserRole::ShopMechanic),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    pub fn can_access_portal(&self) -> bool {
        matches!(
            self,
            UserRole::ShopOwner | UserRole::ShopMechanic | UserRole::Admin
        )
    }
}

impl User {
    pub const COLLECTION: &'static str = "users";

    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(f), Some(l)) => format!("{f} {l}"),
            (Some(f), None) => f.clone(),
            (None, Some(l)) => l.clone(),
            (None, None) => self.email.clone(),
        }
    }
}
