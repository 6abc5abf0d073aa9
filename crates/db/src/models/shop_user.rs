use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Membership of a user in a shop.
///
/// At most one active membership may exist per (shop, user) pair; the
/// DAO checks for an existing record before inserting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopUser {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub shop_id: ObjectId,
    pub user_id: ObjectId,
    #[serde(default)]
    pub role: MemberRole,
    /// Mechanic profile this member works as, when linked at invite time.
    pub mechanic_id: Option<ObjectId>,
    #[serde(default = "bool_true")]
    pub is_active: bool,
    pub invited_at: Option<DateTime>,
    pub accepted_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Manager,
    #[default]
    Mechanic,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Manager => "manager",
            MemberRole::Mechanic => "mechanic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(MemberRole::Owner),
            "manager" => Some(MemberRole::Manager),
            "mechanic" => Some(MemberRole::Mechanic),
            _ => None,
        }
    }

    /// Whether this member may manage the team (invite, revoke).
    pub fn can_manage_team(&self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Manager)
    }
}

fn bool_true() -> bool {
    true
}

impl ShopUser {
    pub const COLLECTION: &'static str = "shop_users";
}
