use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Public-facing mechanic profile within a shop.
///
/// May be created at invite time, before the invitee has an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mechanic {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub shop_id: ObjectId,
    pub name: String,
    pub title: Option<String>,
    #[serde(default = "bool_true")]
    pub is_active: bool,
    #[serde(default)]
    pub rating_avg: f64,
    #[serde(default)]
    pub rating_count: u32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

fn bool_true() -> bool {
    true
}

impl Mechanic {
    pub const COLLECTION: &'static str = "mechanics";
}
