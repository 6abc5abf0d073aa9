use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Landing-page waitlist signup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitlistEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime,
}

impl WaitlistEntry {
    pub const COLLECTION: &'static str = "waitlist";
}
