use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shop {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    /// Unique URL slug. Immutable after creation.
    pub slug: String,
    pub description: Option<String>,
    #[serde(default)]
    pub address: ShopAddress,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub owner_id: ObjectId,
    #[serde(default = "bool_true")]
    pub is_active: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub deleted_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShopAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

fn bool_true() -> bool {
    true
}

impl Shop {
    pub const COLLECTION: &'static str = "shops";
}
